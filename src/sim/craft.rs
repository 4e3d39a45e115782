//! Player craft
//!
//! The craft sits locked at its spawn point until the player commits fuel
//! (thrust or burst), then flies through the field under the shared stepping
//! rule. Notifications are queued and handed back from [`Craft::tick`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::bounds::Bounds;
use super::registry::FieldRegistry;
use crate::tuning::{CraftTuning, SteeringTuning, Tuning};
use crate::{heading_dir, wrap_degrees};

/// Launch gate state for one flight attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchGate {
    /// Held at the spawn point; fields are sampled but do not move the craft
    Locked,
    /// Free flight until the next restart
    Launched,
}

/// Why a craft was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    OutOfBounds,
    AttractorContact,
}

impl LossReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LossReason::OutOfBounds => "left the play area",
            LossReason::AttractorContact => "crashed into an attractor",
        }
    }
}

impl std::fmt::Display for LossReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notifications raised by the craft for the surrounding game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CraftEvent {
    FuelChanged { current: f32, max: f32 },
    /// Fuel crossed from positive to empty (once per crossing)
    OutOfFuel,
    Lost { reason: LossReason },
    /// First propulsive action of this attempt
    FirstLaunch,
}

/// Turns a raw tilt signal into a smoothed steering value (degrees)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteeringFilter {
    raw: f32,
    zero: f32,
    filtered: f32,
}

impl SteeringFilter {
    /// Non-finite readings are dropped and the last good tilt is kept
    pub fn set_input(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.raw = degrees;
        }
    }

    /// Treat the current raw tilt as neutral
    pub fn calibrate_zero(&mut self) {
        self.zero = self.raw;
    }

    pub fn filtered(&self) -> f32 {
        self.filtered
    }

    /// Zero the smoothed value, keeping input and calibration
    pub fn reset(&mut self) {
        self.filtered = 0.0;
    }

    /// Advance smoothing toward the current input and return the filtered tilt
    pub fn update(&mut self, tuning: &SteeringTuning, dt: f32) -> f32 {
        let centered = self.raw - self.zero;
        let magnitude = (centered.abs() - tuning.deadzone).max(0.0);
        let mut target = magnitude.copysign(centered);
        if tuning.invert {
            target = -target;
        }

        if tuning.smoothing > 0.0 {
            let blend = 1.0 - (-tuning.smoothing * dt).exp();
            self.filtered += (target - self.filtered) * blend;
        } else {
            self.filtered = target;
        }
        self.filtered
    }

    /// Turn rate in degrees per second for the current filtered tilt
    pub fn turn_rate(&self, tuning: &SteeringTuning) -> f32 {
        (self.filtered * tuning.gain).clamp(-tuning.max_turn_rate, tuning.max_turn_rate)
    }
}

/// The player-controlled body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub body: Body,
    spawn: Vec2,
    fuel: f32,
    gate: LaunchGate,
    /// Degrees, wrapped to (-180, 180]; zero points up
    heading: f32,
    thrust_active: bool,
    sustained_active: bool,
    steering: SteeringFilter,
    launch_reported: bool,
    lost: bool,
    field_accel: Vec2,
    tuning: CraftTuning,
    steering_tuning: SteeringTuning,
    #[serde(skip)]
    events: Vec<CraftEvent>,
}

impl Craft {
    pub fn new(spawn: Vec2, tuning: &Tuning) -> Self {
        let craft = &tuning.craft;
        Self {
            body: Body::new(spawn, Vec2::ZERO, craft.body_params()),
            spawn,
            fuel: craft.fuel_max,
            gate: initial_gate(craft, true),
            heading: wrap_degrees(craft.initial_heading),
            thrust_active: false,
            sustained_active: false,
            steering: SteeringFilter::default(),
            launch_reported: false,
            lost: false,
            field_accel: Vec2::ZERO,
            tuning: craft.clone(),
            steering_tuning: tuning.steering.clone(),
            events: Vec::new(),
        }
    }

    // === Input ===

    pub fn set_thrust(&mut self, active: bool) {
        self.thrust_active = active;
    }

    pub fn set_sustained(&mut self, active: bool) {
        self.sustained_active = active;
    }

    pub fn set_steering_input(&mut self, degrees: f32) {
        self.steering.set_input(degrees);
    }

    pub fn calibrate_steering_zero(&mut self) {
        self.steering.calibrate_zero();
    }

    /// Instant impulse along the heading. Launches a locked craft.
    ///
    /// Returns false (and does nothing) if fuel cannot cover the cost or the craft is lost.
    pub fn fire_burst(&mut self) -> bool {
        if self.lost || self.fuel < self.tuning.burst_fuel_cost {
            return false;
        }
        self.body.vel += self.forward() * self.tuning.burst_impulse;
        self.spend_fuel(self.tuning.burst_fuel_cost);
        self.launch();
        true
    }

    /// Reset this attempt in place: position, velocity, heading, fuel and gate
    pub fn restart_at(&mut self, position: Vec2, reset_fuel: bool, relock: bool) {
        self.spawn = position;
        self.body.pos = position;
        self.body.vel = Vec2::ZERO;
        self.heading = wrap_degrees(self.tuning.initial_heading);
        self.steering.reset();
        self.thrust_active = false;
        self.sustained_active = false;
        self.gate = initial_gate(&self.tuning, relock);
        self.launch_reported = false;
        self.lost = false;
        self.field_accel = Vec2::ZERO;
        if reset_fuel {
            self.fuel = self.tuning.fuel_max;
        }
        self.push_fuel_changed();
        log::info!("Craft restarted at ({:.2}, {:.2})", position.x, position.y);
    }

    /// Set fuel directly (refuel), clamped to `[0, fuel_max]`
    pub fn set_fuel(&mut self, fuel: f32) {
        let before = self.fuel;
        self.fuel = fuel.clamp(0.0, self.tuning.fuel_max);
        self.after_fuel_change(before);
    }

    // === Simulation ===

    /// Advance one fixed step and return the notifications raised since the last tick
    pub fn tick(
        &mut self,
        registry: &FieldRegistry,
        bounds: &Bounds,
        time: f32,
        dt: f32,
    ) -> Vec<CraftEvent> {
        self.integrate_heading(dt);

        if self.lost {
            self.body.vel = Vec2::ZERO;
            return self.drain_events();
        }

        self.field_accel = registry.acceleration_at(self.body.pos, self.body.vel, time);

        if self.gate == LaunchGate::Locked {
            if self.can_thrust() {
                self.launch();
            } else {
                self.body.pos = self.spawn;
                self.body.vel = Vec2::ZERO;
                return self.drain_events();
            }
        }

        let mut accel = self.field_accel;
        if self.can_thrust() {
            let boost = if self.sustained_active {
                1.0 + self.tuning.sustained_boost
            } else {
                1.0
            };
            accel += self.forward() * self.tuning.thrust_accel * boost;

            let drain_rate = if self.sustained_active {
                self.tuning.fuel_drain_per_sec * self.tuning.sustained_drain_multiplier
            } else {
                self.tuning.fuel_drain_per_sec
            };
            self.spend_fuel(drain_rate * dt);
            self.report_launch();
        }

        self.body.step(accel, dt);

        if !bounds.contains(self.body.pos) {
            self.lose(LossReason::OutOfBounds);
        } else if registry
            .lethal_contact(self.body.pos, self.tuning.hull_radius)
            .is_some()
        {
            self.lose(LossReason::AttractorContact);
        }

        self.drain_events()
    }

    /// Take any queued notifications (e.g. from a burst fired between ticks)
    pub fn drain_events(&mut self) -> Vec<CraftEvent> {
        std::mem::take(&mut self.events)
    }

    // === Read-only state ===

    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    pub fn fuel_max(&self) -> f32 {
        self.tuning.fuel_max
    }

    pub fn gate(&self) -> LaunchGate {
        self.gate
    }

    pub fn is_launched(&self) -> bool {
        self.gate == LaunchGate::Launched
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn forward(&self) -> Vec2 {
        heading_dir(self.heading)
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn thrust_active(&self) -> bool {
        self.thrust_active
    }

    pub fn sustained_active(&self) -> bool {
        self.sustained_active
    }

    /// Field acceleration sampled on the last tick (also while locked)
    pub fn field_accel(&self) -> Vec2 {
        self.field_accel
    }

    pub fn steering(&self) -> &SteeringFilter {
        &self.steering
    }

    // === Internals ===

    #[inline]
    fn can_thrust(&self) -> bool {
        self.thrust_active && self.fuel > self.tuning.min_fuel_to_thrust
    }

    fn integrate_heading(&mut self, dt: f32) {
        self.steering.update(&self.steering_tuning, dt);
        let rate = self.steering.turn_rate(&self.steering_tuning);
        self.heading = wrap_degrees(self.heading + rate * dt);
    }

    fn launch(&mut self) {
        if self.gate == LaunchGate::Locked {
            self.gate = LaunchGate::Launched;
            log::info!("Craft launched (fuel {:.2})", self.fuel);
        }
        self.report_launch();
    }

    fn report_launch(&mut self) {
        if !self.launch_reported {
            self.launch_reported = true;
            self.events.push(CraftEvent::FirstLaunch);
        }
    }

    fn spend_fuel(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let before = self.fuel;
        self.fuel = (self.fuel - amount).max(0.0);
        self.after_fuel_change(before);
    }

    fn after_fuel_change(&mut self, before: f32) {
        if self.fuel == before {
            return;
        }
        self.push_fuel_changed();
        if before > 0.0 && self.fuel <= 0.0 {
            log::info!("Craft out of fuel");
            self.events.push(CraftEvent::OutOfFuel);
        }
    }

    fn push_fuel_changed(&mut self) {
        self.events.push(CraftEvent::FuelChanged {
            current: self.fuel,
            max: self.tuning.fuel_max,
        });
    }

    fn lose(&mut self, reason: LossReason) {
        self.lost = true;
        self.body.vel = Vec2::ZERO;
        log::info!("Craft lost: {}", reason);
        self.events.push(CraftEvent::Lost { reason });
    }
}

fn initial_gate(tuning: &CraftTuning, relock: bool) -> LaunchGate {
    if tuning.launch_gating && relock {
        LaunchGate::Locked
    } else {
        LaunchGate::Launched
    }
}
