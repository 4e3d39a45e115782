//! Probe projectiles
//!
//! A probe is launched from the planning screen, drifts through the field and
//! either docks (turning into a field source), leaves the play area, or stalls.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::bounds::Bounds;
use super::dock::{DockId, DockSet};
use super::field::SourceId;
use super::registry::FieldRegistry;
use crate::tuning::{FieldDefaults, ProbeTuning};

/// What a probe turns into when it docks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeType {
    Attractor,
    Repulsor,
    Stabilizer,
    Patch,
    Vortex,
}

impl ProbeType {
    pub const ALL: [ProbeType; 5] = [
        ProbeType::Attractor,
        ProbeType::Repulsor,
        ProbeType::Stabilizer,
        ProbeType::Patch,
        ProbeType::Vortex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeType::Attractor => "attractor",
            ProbeType::Repulsor => "repulsor",
            ProbeType::Stabilizer => "stabilizer",
            ProbeType::Patch => "patch",
            ProbeType::Vortex => "vortex",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProbeId(pub u32);

/// Result of a probe tick. Anything but `Active` means the probe is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Active,
    /// Snapped into a dock, which now hosts `source`
    Docked { dock: DockId, source: SourceId },
    /// Left the play area
    OutOfBounds,
    /// Sat below the stationary speed for too long
    Stalled,
}

impl ProbeStatus {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, ProbeStatus::Active)
    }
}

/// A probe in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Probe {
    pub id: ProbeId,
    pub probe_type: ProbeType,
    pub body: Body,
    /// Seconds since spawn
    pub age: f32,
    /// Seconds spent continuously at or below the stationary speed
    pub stationary_timer: f32,
}

impl Probe {
    pub fn new(
        id: ProbeId,
        origin: Vec2,
        velocity: Vec2,
        probe_type: ProbeType,
        tuning: &ProbeTuning,
    ) -> Self {
        Self {
            id,
            probe_type,
            body: Body::new(origin, velocity, tuning.body_params()),
            age: 0.0,
            stationary_timer: 0.0,
        }
    }

    /// Advance one fixed step: field, integrate, dock, then cleanup checks
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        registry: &mut FieldRegistry,
        docks: &mut DockSet,
        bounds: &Bounds,
        tuning: &ProbeTuning,
        fields: &FieldDefaults,
        time: f32,
        dt: f32,
    ) -> ProbeStatus {
        self.age += dt;
        self.body.step_in_field(registry, Vec2::ZERO, time, dt);

        if let Some(dock_id) = docks.find_match(self.body.pos, self.probe_type) {
            if let Some(dock) = docks.get_mut(dock_id) {
                if let Some(source) = dock.spawn_anchor_for(self.probe_type, registry, fields) {
                    self.body.pos = dock.position;
                    self.body.vel = Vec2::ZERO;
                    return ProbeStatus::Docked {
                        dock: dock_id,
                        source,
                    };
                }
            }
        }

        if !bounds.contains(self.body.pos) {
            return ProbeStatus::OutOfBounds;
        }

        if self.age >= tuning.spawn_grace {
            if self.body.speed() <= tuning.stationary_speed {
                self.stationary_timer += dt;
                if self.stationary_timer >= tuning.stationary_timeout {
                    return ProbeStatus::Stalled;
                }
            } else {
                self.stationary_timer = 0.0;
            }
        }

        ProbeStatus::Active
    }
}
