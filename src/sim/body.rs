//! Moving bodies and the shared stepping rule
//!
//! The craft, every probe and the trajectory predictor all advance through
//! [`Body::step`], so a preview path matches the live flight exactly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::registry::FieldRegistry;
use crate::clamp_magnitude;

/// Integration parameters for a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    pub max_speed: f32,
    pub linear_drag: f32,
}

/// Position and velocity of a moving body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub params: BodyParams,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, params: BodyParams) -> Self {
        Self { pos, vel, params }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Semi-implicit Euler step: accelerate, clamp speed, apply drag, translate.
    ///
    /// The order is part of the contract; changing it changes trajectories.
    pub fn step(&mut self, accel: Vec2, dt: f32) {
        self.vel += accel * dt;
        self.vel = clamp_magnitude(self.vel, self.params.max_speed);
        self.vel *= 1.0 / (1.0 + self.params.linear_drag * dt);
        self.pos += self.vel * dt;
    }

    /// Sample the registry at the current state, then step
    pub fn step_in_field(
        &mut self,
        registry: &FieldRegistry,
        extra_accel: Vec2,
        time: f32,
        dt: f32,
    ) -> Vec2 {
        let field = registry.acceleration_at(self.pos, self.vel, time);
        self.step(field + extra_accel, dt);
        field
    }
}
