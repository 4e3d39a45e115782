//! Session state
//!
//! One [`SimState`] per simulation session: it owns the field registry and
//! every body that reads it. Nothing here is global.

use glam::Vec2;

use super::bounds::Bounds;
use super::craft::Craft;
use super::dock::{DockId, DockSet};
use super::field::{FieldLaw, FieldSource, SourceId};
use super::predictor::TrajectoryPredictor;
use super::probe::{Probe, ProbeId, ProbeType};
use super::registry::FieldRegistry;
use crate::consts::SIM_DT;
use crate::level::LevelConfig;
use crate::tuning::Tuning;

/// Complete simulation session
#[derive(Debug, Clone)]
pub struct SimState {
    pub tuning: Tuning,
    pub level: LevelConfig,
    pub registry: FieldRegistry,
    pub craft: Craft,
    /// Probes in flight (sorted by id for determinism)
    pub probes: Vec<Probe>,
    pub docks: DockSet,
    pub predictor: TrajectoryPredictor,
    pub bounds: Bounds,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds
    pub elapsed: f32,
    /// Fixed timestep shared by live bodies and the predictor
    dt: f32,
    /// Sources placed by the level or by `place_source`
    placed: Vec<SourceId>,
    next_probe_id: u32,
}

impl SimState {
    /// Build a session for `level` stepping at [`SIM_DT`]
    pub fn new(level: LevelConfig, tuning: Tuning) -> Self {
        Self::with_timestep(level, tuning, SIM_DT)
    }

    /// Build a session with a custom fixed timestep
    pub fn with_timestep(level: LevelConfig, tuning: Tuning, dt: f32) -> Self {
        let predictor =
            TrajectoryPredictor::new(tuning.predictor.clone(), tuning.probe.body_params(), dt);
        let mut state = Self {
            craft: Craft::new(level.spawn, &tuning),
            bounds: level.bounds(),
            registry: FieldRegistry::new(),
            probes: Vec::new(),
            docks: DockSet::new(),
            predictor,
            time_ticks: 0,
            elapsed: 0.0,
            dt,
            placed: Vec::new(),
            next_probe_id: 1,
            tuning,
            level,
        };
        state.populate();
        log::info!("Session started for level '{}'", state.level.name);
        state
    }

    /// Register level sources and build docks
    fn populate(&mut self) {
        for placed in &self.level.sources {
            let id = self.registry.next_source_id();
            let mut source = FieldSource::new(id, placed.position, placed.law);
            source.enabled = placed.enabled;
            self.registry.register(source);
            self.placed.push(id);
        }
        for (i, config) in self.level.docks.iter().enumerate() {
            self.docks.add(config.build(DockId(i as u32)));
        }
    }

    /// Tear down all sources, docks and probes, then rebuild the level and relock the craft
    pub fn reset_level(&mut self) {
        self.docks.reset(&mut self.registry);
        for id in self.placed.drain(..) {
            self.registry.unregister(id);
        }
        self.registry.clear();
        self.probes.clear();
        self.predictor.reset();
        self.bounds = self.level.bounds();
        self.populate();
        self.craft.restart_at(self.level.spawn, true, true);
        log::info!("Level '{}' reset", self.level.name);
    }

    /// Retry the flight from the level spawn, keeping docked sources
    pub fn restart_craft(&mut self) {
        self.craft.restart_at(self.level.spawn, true, true);
    }

    /// Launch a probe from the planning screen
    pub fn spawn_probe(&mut self, origin: Vec2, velocity: Vec2, probe_type: ProbeType) -> ProbeId {
        let id = ProbeId(self.next_probe_id);
        self.next_probe_id += 1;
        self.probes
            .push(Probe::new(id, origin, velocity, probe_type, &self.tuning.probe));
        log::debug!(
            "Spawned {} probe {:?} at ({:.2}, {:.2})",
            probe_type.as_str(),
            id,
            origin.x,
            origin.y
        );
        id
    }

    /// Place a source directly (not through a dock)
    pub fn place_source(&mut self, position: Vec2, law: FieldLaw) -> SourceId {
        let id = self.registry.next_source_id();
        self.registry.register(FieldSource::new(id, position, law));
        self.placed.push(id);
        id
    }

    /// Remove a directly placed source
    pub fn remove_source(&mut self, id: SourceId) -> Option<FieldSource> {
        let index = self.placed.iter().position(|p| *p == id)?;
        self.placed.remove(index);
        self.registry.unregister(id)
    }

    /// Clear every dock, returning how many held a source
    pub fn clear_all_docks(&mut self) -> usize {
        self.docks.clear_all_docks(&mut self.registry)
    }

    /// Clear one dock
    pub fn clear_dock(&mut self, id: DockId) -> Option<FieldSource> {
        self.docks.get_mut(id)?.clear_anchor(&mut self.registry)
    }

    /// Rebuild the trajectory preview for a hypothetical probe launch
    pub fn preview(&mut self, origin: Vec2, velocity: Vec2) -> &[Vec2] {
        self.predictor.draw(&self.registry, origin, velocity)
    }

    pub fn probe(&self, id: ProbeId) -> Option<&Probe> {
        self.probes.iter().find(|p| p.id == id)
    }

    /// Fixed timestep of this session
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Level scoring target
    pub fn par(&self) -> u32 {
        self.level.par
    }

    /// Ensure probes are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.probes.sort_by_key(|p| p.id);
    }
}
