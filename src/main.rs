//! Vector Drift headless runner
//!
//! Flies a scripted session: the craft launches and steers while seeded random
//! probes are previewed and thrown at the level's docks.
//!
//! Usage: `vector-drift [tuning.json] [level.json] [seed]`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use vector_drift::consts::MAX_SUBSTEPS;
use vector_drift::level::{DockConfig, PlacedSource};
use vector_drift::sim::{CraftEvent, FieldLaw, ProbeType, SimEvent, SimState, TickInput, tick};
use vector_drift::{ConfigError, LevelConfig, Tuning};

/// Simulated render frame length (30 Hz, so two substeps per frame)
const FRAME_DT: f32 = 1.0 / 30.0;
const FRAMES: u32 = 900;
/// Ticks between probe launches
const PROBE_INTERVAL: u64 = 75;
const DEFAULT_SEED: u64 = 0x5eed_d21f;

fn default_level() -> LevelConfig {
    LevelConfig {
        name: "drift demo".to_string(),
        par: 3,
        docks: vec![
            DockConfig {
                position: Vec2::new(2.5, 1.0),
                snap_radius: 0.5,
                accepts: vec![ProbeType::Attractor, ProbeType::Repulsor],
                overrides: Default::default(),
            },
            DockConfig {
                position: Vec2::new(-2.5, 2.0),
                snap_radius: 0.5,
                accepts: vec![ProbeType::Vortex, ProbeType::Stabilizer, ProbeType::Patch],
                overrides: Default::default(),
            },
        ],
        sources: vec![PlacedSource {
            position: Vec2::new(0.0, 5.0),
            law: FieldLaw::Attractor {
                strength: 8.0,
                softening: 0.3,
                max_accel: 9.0,
                contact_radius: 0.5,
            },
            enabled: true,
        }],
        ..Default::default()
    }
}

fn load_inputs(args: &[String]) -> Result<(Tuning, LevelConfig, u64), ConfigError> {
    let tuning = match args.get(1) {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let level = match args.get(2) {
        Some(path) => LevelConfig::load(path)?,
        None => default_level(),
    };
    let seed = match args.get(3) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            field: "seed",
            reason: format!("'{raw}' is not an unsigned integer"),
        })?,
        None => DEFAULT_SEED,
    };
    Ok((tuning, level, seed))
}

fn random_launch(rng: &mut Pcg32, spawn: Vec2) -> (Vec2, Vec2, ProbeType) {
    let probe_type = ProbeType::ALL[rng.random_range(0..ProbeType::ALL.len())];
    let angle = rng.random_range(-60.0f32..60.0).to_radians();
    let speed = rng.random_range(2.0f32..6.0);
    let origin = spawn + Vec2::new(rng.random_range(-1.0..1.0), 0.5);
    (origin, Vec2::new(angle.sin(), angle.cos()) * speed, probe_type)
}

fn script_input(state: &SimState, rng: &mut Pcg32) -> TickInput {
    let phase = state.time_ticks % 300;
    TickInput {
        thrust: phase > 30 && phase < 90,
        sustained: phase > 60 && phase < 75,
        burst: phase == 120,
        steering: Some(rng.random_range(-15.0..15.0)),
        calibrate_steering: state.time_ticks == 1,
    }
}

fn run(tuning: Tuning, level: LevelConfig, seed: u64) {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut state = SimState::new(level, tuning);
    let dt = state.dt();
    let mut accumulator = 0.0;
    let mut docked = 0u32;
    let mut losses = 0u32;

    for _ in 0..FRAMES {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= dt && substeps < MAX_SUBSTEPS {
            if state.time_ticks % PROBE_INTERVAL == 0 {
                let (origin, velocity, probe_type) = random_launch(&mut rng, state.level.spawn);
                state.predictor.show();
                let preview = state.preview(origin, velocity);
                log::debug!(
                    "Preview for {} probe: {} points, ends at {:?}",
                    probe_type.as_str(),
                    preview.len(),
                    preview.last()
                );
                state.predictor.clear();
                state.spawn_probe(origin, velocity, probe_type);
            }

            let input = script_input(&state, &mut rng);
            for event in tick(&mut state, &input) {
                match event {
                    SimEvent::ProbeDocked { probe, dock, source } => {
                        docked += 1;
                        log::info!("Probe {:?} docked at {:?} as {:?}", probe, dock, source);
                    }
                    SimEvent::ProbeExpired { probe, status } => {
                        log::debug!("Probe {:?} expired: {:?}", probe, status);
                    }
                    SimEvent::Craft(craft_event) => {
                        log::debug!("Craft: {:?}", craft_event);
                        if let CraftEvent::Lost { reason } = craft_event {
                            losses += 1;
                            log::info!("Craft lost ({reason}) after {:.2}s", state.elapsed);
                            state.restart_craft();
                        }
                    }
                }
            }

            accumulator -= dt;
            substeps += 1;
        }
        if substeps >= MAX_SUBSTEPS {
            accumulator = 0.0;
        }
    }

    log::info!(
        "Finished {} ticks: {} probes docked, {} craft losses, {} active sources, fuel {:.2}/{:.2}",
        state.time_ticks,
        docked,
        losses,
        state.registry.len(),
        state.craft.fuel(),
        state.craft.fuel_max()
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Vector Drift (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    match load_inputs(&args) {
        Ok((tuning, level, seed)) => run(tuning, level, seed),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; there is no headless runner
}
