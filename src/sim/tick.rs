//! Fixed timestep simulation tick
//!
//! Advances the craft, then every probe in id order. A source spawned by a
//! dock mid-tick is already live for probes ticked after it.

use super::craft::CraftEvent;
use super::dock::DockId;
use super::field::SourceId;
use super::probe::{ProbeId, ProbeStatus};
use super::state::SimState;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Thrust held
    pub thrust: bool,
    /// Sustained latch held (boosts thrust and drain)
    pub sustained: bool,
    /// Fire a burst this tick
    pub burst: bool,
    /// Raw steering tilt in degrees
    pub steering: Option<f32>,
    /// Use the current tilt as neutral
    pub calibrate_steering: bool,
}

/// Everything that happened during a tick, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Craft(CraftEvent),
    ProbeDocked {
        probe: ProbeId,
        dock: DockId,
        source: SourceId,
    },
    /// Probe destroyed without docking (out of bounds or stalled)
    ProbeExpired { probe: ProbeId, status: ProbeStatus },
}

/// Advance the session by one fixed timestep of [`SimState::dt`]
pub fn tick(state: &mut SimState, input: &TickInput) -> Vec<SimEvent> {
    state.time_ticks += 1;
    let time = state.elapsed;
    let dt = state.dt();

    let craft = &mut state.craft;
    if let Some(tilt) = input.steering {
        craft.set_steering_input(tilt);
    }
    if input.calibrate_steering {
        craft.calibrate_steering_zero();
    }
    craft.set_thrust(input.thrust);
    craft.set_sustained(input.sustained);
    if input.burst && !craft.fire_burst() {
        log::debug!("Burst refused (fuel {:.2})", craft.fuel());
    }

    let mut events: Vec<SimEvent> = craft
        .tick(&state.registry, &state.bounds, time, dt)
        .into_iter()
        .map(SimEvent::Craft)
        .collect();

    let SimState {
        probes,
        registry,
        docks,
        bounds,
        tuning,
        ..
    } = state;

    let mut removed = Vec::new();
    for probe in probes.iter_mut() {
        let status = probe.tick(
            registry,
            docks,
            bounds,
            &tuning.probe,
            &tuning.fields,
            time,
            dt,
        );
        match status {
            ProbeStatus::Active => {}
            ProbeStatus::Docked { dock, source } => {
                events.push(SimEvent::ProbeDocked {
                    probe: probe.id,
                    dock,
                    source,
                });
                removed.push(probe.id);
            }
            ProbeStatus::OutOfBounds | ProbeStatus::Stalled => {
                log::debug!("Probe {:?} removed: {:?}", probe.id, status);
                events.push(SimEvent::ProbeExpired {
                    probe: probe.id,
                    status,
                });
                removed.push(probe.id);
            }
        }
    }
    if !removed.is_empty() {
        probes.retain(|p| !removed.contains(&p.id));
    }
    state.normalize_order();

    state.predictor.update(dt);
    state.elapsed += dt;
    events
}
