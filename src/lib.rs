//! Vector Drift - deterministic 2D vector-field flight simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (field sources, bodies, docking, prediction)
//! - `tuning`: Data-driven balance parameters
//! - `level`: Level layout (spawn, bounds, docks, placed sources)
//! - `error`: Configuration loading errors

pub mod error;
pub mod level;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use level::LevelConfig;
pub use tuning::Tuning;

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Soft-core constant for attractor/repulsor laws
    pub const DEFAULT_SOFTENING: f32 = 0.3;
    /// Acceleration clamp applied by field sources
    pub const DEFAULT_MAX_FIELD_ACCEL: f32 = 9.0;

    /// Probe speed below which it counts as stationary
    pub const PROBE_STATIONARY_SPEED: f32 = 0.05;
    /// Time after spawn before the stationary timer may run
    pub const PROBE_SPAWN_GRACE: f32 = 0.15;
    /// Continuous stationary time before a probe is destroyed
    pub const PROBE_STATIONARY_TIMEOUT: f32 = 0.6;

    /// Fuel must strictly exceed this for thrust to engage
    pub const MIN_FUEL_TO_THRUST: f32 = 0.05;
}

/// Wrap an angle in degrees to (-180, 180]
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// Forward direction for a heading in degrees ("up" is zero, clockwise positive)
#[inline]
pub fn heading_dir(heading_deg: f32) -> Vec2 {
    let rad = heading_deg.to_radians();
    Vec2::new(rad.sin(), rad.cos())
}

/// Rescale `v` so its length does not exceed `max`, preserving direction
#[inline]
pub fn clamp_magnitude(v: Vec2, max: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}
