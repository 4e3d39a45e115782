//! Data-driven tuning
//!
//! Every parameter of the simulation that a designer might want to touch.
//! Missing JSON fields fall back to the defaults below.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::body::BodyParams;
use crate::sim::dock::FieldOverride;
use crate::sim::field::{FieldLaw, PatchEdge, Spin};
use crate::sim::probe::ProbeType;

/// Player craft parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftTuning {
    pub max_speed: f32,
    pub linear_drag: f32,
    /// Collision radius used for attractor contact
    pub hull_radius: f32,

    // === Fuel ===
    pub fuel_max: f32,
    /// Fuel drained per second while thrusting
    pub fuel_drain_per_sec: f32,
    /// Drain multiplier while the sustained latch is held
    pub sustained_drain_multiplier: f32,
    /// Thrust only engages while fuel is strictly above this
    pub min_fuel_to_thrust: f32,

    // === Propulsion ===
    /// Thrust acceleration along the heading
    pub thrust_accel: f32,
    /// Fractional thrust boost while sustained (0.5 = +50%)
    pub sustained_boost: f32,
    /// Instant velocity added by a burst
    pub burst_impulse: f32,
    /// One-time fuel cost of a burst
    pub burst_fuel_cost: f32,

    // === Launch ===
    /// Hold the craft at its spawn point until the first propulsive action
    pub launch_gating: bool,
    /// Heading (degrees) on spawn and restart
    pub initial_heading: f32,
}

impl Default for CraftTuning {
    fn default() -> Self {
        Self {
            max_speed: 6.0,
            linear_drag: 0.1,
            hull_radius: 0.25,

            fuel_max: 1.0,
            fuel_drain_per_sec: 0.1,
            sustained_drain_multiplier: 2.0,
            min_fuel_to_thrust: MIN_FUEL_TO_THRUST,

            thrust_accel: 4.0,
            sustained_boost: 0.5,
            burst_impulse: 2.5,
            burst_fuel_cost: 0.15,

            launch_gating: true,
            initial_heading: 0.0,
        }
    }
}

impl CraftTuning {
    pub fn body_params(&self) -> BodyParams {
        BodyParams {
            max_speed: self.max_speed,
            linear_drag: self.linear_drag,
        }
    }
}

/// Tilt-to-turn filter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringTuning {
    /// Turn rate (deg/s) per degree of filtered tilt
    pub gain: f32,
    /// Turn rate cap in degrees per second
    pub max_turn_rate: f32,
    /// Tilt (degrees) ignored around the calibrated zero
    pub deadzone: f32,
    pub invert: bool,
    /// Exponential smoothing rate (1/s); 0 disables smoothing
    pub smoothing: f32,
}

impl Default for SteeringTuning {
    fn default() -> Self {
        Self {
            gain: 4.0,
            max_turn_rate: 180.0,
            deadzone: 2.0,
            invert: false,
            smoothing: 10.0,
        }
    }
}

/// Probe projectile parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeTuning {
    pub max_speed: f32,
    pub linear_drag: f32,
    /// Speed at or below which the probe counts as stationary
    pub stationary_speed: f32,
    /// Seconds after spawn before the stationary timer runs
    pub spawn_grace: f32,
    /// Seconds of continuous stationarity before the probe is destroyed
    pub stationary_timeout: f32,
}

impl Default for ProbeTuning {
    fn default() -> Self {
        Self {
            max_speed: 8.0,
            linear_drag: 0.05,
            stationary_speed: PROBE_STATIONARY_SPEED,
            spawn_grace: PROBE_SPAWN_GRACE,
            stationary_timeout: PROBE_STATIONARY_TIMEOUT,
        }
    }
}

impl ProbeTuning {
    pub fn body_params(&self) -> BodyParams {
        BodyParams {
            max_speed: self.max_speed,
            linear_drag: self.linear_drag,
        }
    }
}

/// Trajectory preview parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorTuning {
    pub max_points: usize,
    /// Maximum simulated seconds per preview
    pub max_duration: f32,
    /// Launch speeds below this draw nothing
    pub min_launch_speed: f32,
    /// Seconds for a cleared preview to fade out
    pub fade_duration: f32,
}

impl Default for PredictorTuning {
    fn default() -> Self {
        Self {
            max_points: 120,
            max_duration: 3.0,
            min_launch_speed: 0.05,
            fade_duration: 0.35,
        }
    }
}

/// Field laws spawned by docks, one default per probe type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    pub attractor_strength: f32,
    pub repulsor_strength: f32,
    pub softening: f32,
    pub contact_radius: f32,
    pub stabilizer_depth: f32,
    pub stabilizer_radius: f32,
    pub patch_accel: Vec2,
    pub patch_radius: f32,
    pub patch_edge: PatchEdge,
    pub vortex_swirl: f32,
    pub vortex_radius: f32,
    pub vortex_spin: Spin,
    /// Clamp shared by every spawned law
    pub max_accel: f32,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            attractor_strength: 12.0,
            repulsor_strength: 12.0,
            softening: DEFAULT_SOFTENING,
            contact_radius: 0.4,
            stabilizer_depth: 3.0,
            stabilizer_radius: 1.5,
            patch_accel: Vec2::new(0.0, 2.0),
            patch_radius: 1.5,
            patch_edge: PatchEdge::Soft,
            vortex_swirl: 2.0,
            vortex_radius: 2.0,
            vortex_spin: Spin::CounterClockwise,
            max_accel: DEFAULT_MAX_FIELD_ACCEL,
        }
    }
}

impl FieldDefaults {
    /// Law a dock spawns for a docked probe of `probe_type`
    pub fn law_for(&self, probe_type: ProbeType) -> FieldLaw {
        match probe_type {
            ProbeType::Attractor => FieldLaw::Attractor {
                strength: self.attractor_strength.abs(),
                softening: self.softening,
                max_accel: self.max_accel,
                contact_radius: self.contact_radius,
            },
            ProbeType::Repulsor => FieldLaw::Attractor {
                strength: -self.repulsor_strength.abs(),
                softening: self.softening,
                max_accel: self.max_accel,
                contact_radius: self.contact_radius,
            },
            ProbeType::Stabilizer => FieldLaw::Stabilizer {
                depth: self.stabilizer_depth,
                radius: self.stabilizer_radius,
                max_accel: self.max_accel,
            },
            ProbeType::Patch => FieldLaw::Patch {
                accel: self.patch_accel,
                radius: self.patch_radius,
                edge: self.patch_edge,
                max_accel: self.max_accel,
            },
            ProbeType::Vortex => FieldLaw::Vortex {
                swirl: self.vortex_swirl,
                radius: self.vortex_radius,
                spin: self.vortex_spin,
                max_accel: self.max_accel,
            },
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub craft: CraftTuning,
    pub steering: SteeringTuning,
    pub probe: ProbeTuning,
    pub predictor: PredictorTuning,
    pub fields: FieldDefaults,
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would break the integrator or the fuel model
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("craft.max_speed", self.craft.max_speed)?;
        non_negative("craft.linear_drag", self.craft.linear_drag)?;
        positive("craft.fuel_max", self.craft.fuel_max)?;
        non_negative("craft.fuel_drain_per_sec", self.craft.fuel_drain_per_sec)?;
        non_negative("craft.min_fuel_to_thrust", self.craft.min_fuel_to_thrust)?;
        non_negative("craft.burst_fuel_cost", self.craft.burst_fuel_cost)?;
        non_negative("craft.hull_radius", self.craft.hull_radius)?;
        non_negative("steering.deadzone", self.steering.deadzone)?;
        non_negative("steering.max_turn_rate", self.steering.max_turn_rate)?;
        non_negative("steering.smoothing", self.steering.smoothing)?;
        positive("probe.max_speed", self.probe.max_speed)?;
        non_negative("probe.linear_drag", self.probe.linear_drag)?;
        non_negative("probe.stationary_timeout", self.probe.stationary_timeout)?;
        positive("predictor.max_duration", self.predictor.max_duration)?;
        non_negative("predictor.fade_duration", self.predictor.fade_duration)?;
        if self.predictor.max_points == 0 {
            return Err(ConfigError::invalid("predictor.max_points", "must be at least 1"));
        }
        positive("fields.softening", self.fields.softening)?;
        positive("fields.max_accel", self.fields.max_accel)?;
        for probe_type in ProbeType::ALL {
            validate_law(&self.fields.law_for(probe_type))?;
        }
        Ok(())
    }
}

/// Reject law parameters that would produce NaN or invert the clamp
pub(crate) fn validate_law(law: &FieldLaw) -> Result<(), ConfigError> {
    match *law {
        FieldLaw::Attractor {
            strength,
            softening,
            max_accel,
            contact_radius,
        } => {
            finite("law.strength", strength)?;
            positive("law.softening", softening)?;
            positive("law.max_accel", max_accel)?;
            non_negative("law.contact_radius", contact_radius)
        }
        FieldLaw::Stabilizer {
            depth,
            radius,
            max_accel,
        } => {
            finite("law.depth", depth)?;
            positive("law.radius", radius)?;
            positive("law.max_accel", max_accel)
        }
        FieldLaw::Patch {
            accel,
            radius,
            max_accel,
            ..
        } => {
            finite("law.accel.x", accel.x)?;
            finite("law.accel.y", accel.y)?;
            positive("law.radius", radius)?;
            positive("law.max_accel", max_accel)
        }
        FieldLaw::Vortex {
            swirl,
            radius,
            max_accel,
            ..
        } => {
            finite("law.swirl", swirl)?;
            positive("law.radius", radius)?;
            positive("law.max_accel", max_accel)
        }
    }
}

/// Same limits as [`validate_law`] for the fields an override sets
pub(crate) fn validate_override(field: &FieldOverride) -> Result<(), ConfigError> {
    let checks: [(&'static str, Option<f32>, Check); 9] = [
        ("overrides.strength", field.strength, finite),
        ("overrides.softening", field.softening, positive),
        ("overrides.contact_radius", field.contact_radius, non_negative),
        ("overrides.depth", field.depth, finite),
        ("overrides.radius", field.radius, positive),
        ("overrides.accel.x", field.accel.map(|a| a.x), finite),
        ("overrides.accel.y", field.accel.map(|a| a.y), finite),
        ("overrides.swirl", field.swirl, finite),
        ("overrides.max_accel", field.max_accel, positive),
    ];
    for (name, value, check) in checks {
        if let Some(value) = value {
            check(name, value)?;
        }
    }
    Ok(())
}

type Check = fn(&'static str, f32) -> Result<(), ConfigError>;

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {value}")))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be non-negative, got {value}")))
    }
}
