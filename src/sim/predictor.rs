//! Trajectory preview
//!
//! Re-runs the live stepping rule from a hypothetical launch to produce the
//! path a probe would follow. Never touches the registry or any real body.

use glam::Vec2;

use super::body::{Body, BodyParams};
use super::registry::FieldRegistry;
use crate::tuning::PredictorTuning;

/// Preview path with show/clear/fade handling
#[derive(Debug, Clone)]
pub struct TrajectoryPredictor {
    tuning: PredictorTuning,
    params: BodyParams,
    dt: f32,
    visible: bool,
    /// Remaining fade time after a clear
    fade_remaining: f32,
    points: Vec<Vec2>,
}

impl TrajectoryPredictor {
    /// `params` and `dt` must match the bodies being previewed
    pub fn new(tuning: PredictorTuning, params: BodyParams, dt: f32) -> Self {
        Self {
            points: Vec::with_capacity(tuning.max_points),
            tuning,
            params,
            dt,
            visible: false,
            fade_remaining: 0.0,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.fade_remaining = 0.0;
    }

    /// Hide the preview; the current path fades out over `fade_duration`
    pub fn clear(&mut self) {
        if self.visible {
            self.visible = false;
            self.fade_remaining = self.tuning.fade_duration;
        }
        if self.fade_remaining <= 0.0 {
            self.points.clear();
        }
    }

    /// Drop the path at once, without a fade
    pub fn reset(&mut self) {
        self.visible = false;
        self.fade_remaining = 0.0;
        self.points.clear();
    }

    /// Advance the fade timer
    pub fn update(&mut self, dt: f32) {
        if self.visible || self.fade_remaining <= 0.0 {
            return;
        }
        self.fade_remaining = (self.fade_remaining - dt).max(0.0);
        if self.fade_remaining == 0.0 {
            self.points.clear();
        }
    }

    /// Rebuild the path for a launch from `origin` at `velocity`.
    ///
    /// Launches slower than `min_launch_speed` produce an empty path.
    pub fn draw(&mut self, registry: &FieldRegistry, origin: Vec2, velocity: Vec2) -> &[Vec2] {
        self.points.clear();
        if !self.visible || velocity.length() < self.tuning.min_launch_speed {
            return &self.points;
        }
        simulate_into(
            &mut self.points,
            registry,
            Body::new(origin, velocity, self.params),
            self.dt,
            self.tuning.max_points,
            self.tuning.max_duration,
        );
        log::trace!("Predicted {} points", self.points.len());
        &self.points
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Opacity for rendering: 1 while shown, fading to 0 after a clear
    pub fn alpha(&self) -> f32 {
        if self.visible {
            1.0
        } else if self.tuning.fade_duration > 0.0 {
            (self.fade_remaining / self.tuning.fade_duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Collect positions of `body` stepped through `registry`, starting with its current position
pub fn simulate_path(
    registry: &FieldRegistry,
    body: Body,
    dt: f32,
    max_points: usize,
    max_duration: f32,
) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(max_points);
    simulate_into(&mut points, registry, body, dt, max_points, max_duration);
    points
}

fn simulate_into(
    points: &mut Vec<Vec2>,
    registry: &FieldRegistry,
    mut body: Body,
    dt: f32,
    max_points: usize,
    max_duration: f32,
) {
    if max_points == 0 {
        return;
    }
    points.push(body.pos);
    let mut time = 0.0;
    while points.len() < max_points && time < max_duration {
        body.step_in_field(registry, Vec2::ZERO, time, dt);
        time += dt;
        points.push(body.pos);
    }
}
