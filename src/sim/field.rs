//! Field sources: the four acceleration laws that make up the playfield.
//!
//! Each [`FieldSource`] maps a sample position (and, for vortices, a sample
//! velocity) to an acceleration. Every law rescales its result to the source's
//! `max_accel`, so the sum over any overlap stays bounded.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_magnitude;

/// Radii below this are treated as degenerate and produce no acceleration
const DEGENERATE_RADIUS: f32 = 1e-6;

/// Stable identifier for a field source (unique within a session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u32);

/// Registry bucket a law belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Attractor,
    Stabilizer,
    Patch,
    Vortex,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Attractor,
        FieldKind::Stabilizer,
        FieldKind::Patch,
        FieldKind::Vortex,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            FieldKind::Attractor => 0,
            FieldKind::Stabilizer => 1,
            FieldKind::Patch => 2,
            FieldKind::Vortex => 3,
        }
    }
}

/// Edge profile for a uniform patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchEdge {
    /// Full strength inside `radius`, nothing outside
    #[default]
    Hard,
    /// Strength scaled by `exp(-|r|²/R²)`
    Soft,
}

/// Rotation direction of a vortex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spin {
    #[default]
    CounterClockwise,
    Clockwise,
}

impl Spin {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Spin::CounterClockwise => 1.0,
            Spin::Clockwise => -1.0,
        }
    }
}

/// Acceleration law with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum FieldLaw {
    /// Softened inverse-square pull: `S * r / (|r|² + ε)^1.5`.
    /// Positive `strength` attracts, negative repels.
    Attractor {
        strength: f32,
        softening: f32,
        max_accel: f32,
        /// Body radius used for craft contact checks
        #[serde(default)]
        contact_radius: f32,
    },
    /// Negative gradient of a Gaussian well of `depth` and `radius`
    Stabilizer {
        depth: f32,
        radius: f32,
        max_accel: f32,
    },
    /// Constant vector inside a circular region
    Patch {
        accel: Vec2,
        radius: f32,
        #[serde(default)]
        edge: PatchEdge,
        max_accel: f32,
    },
    /// Velocity-dependent swirl: rotates the body's velocity
    Vortex {
        swirl: f32,
        radius: f32,
        #[serde(default)]
        spin: Spin,
        max_accel: f32,
    },
}

impl FieldLaw {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldLaw::Attractor { .. } => FieldKind::Attractor,
            FieldLaw::Stabilizer { .. } => FieldKind::Stabilizer,
            FieldLaw::Patch { .. } => FieldKind::Patch,
            FieldLaw::Vortex { .. } => FieldKind::Vortex,
        }
    }

    /// Acceleration for a body whose offset to the source center is `r`
    /// (`r = source - sample`) and whose velocity is `velocity`.
    pub fn acceleration(&self, r: Vec2, velocity: Vec2) -> Vec2 {
        match *self {
            FieldLaw::Attractor {
                strength,
                softening,
                max_accel,
                ..
            } => {
                let denom = (r.length_squared() + softening).powf(1.5);
                if denom <= 0.0 {
                    return Vec2::ZERO;
                }
                clamp_magnitude(r * (strength / denom), max_accel)
            }
            FieldLaw::Stabilizer {
                depth,
                radius,
                max_accel,
            } => {
                if radius.abs() < DEGENERATE_RADIUS {
                    return Vec2::ZERO;
                }
                let r2 = radius * radius;
                let falloff = (-r.length_squared() / r2).exp();
                clamp_magnitude(r * (2.0 * depth / r2 * falloff), max_accel)
            }
            FieldLaw::Patch {
                accel,
                radius,
                edge,
                max_accel,
            } => {
                let scaled = match edge {
                    PatchEdge::Hard => {
                        if r.length_squared() <= radius * radius {
                            accel
                        } else {
                            Vec2::ZERO
                        }
                    }
                    PatchEdge::Soft => {
                        if radius.abs() < DEGENERATE_RADIUS {
                            return Vec2::ZERO;
                        }
                        accel * (-r.length_squared() / (radius * radius)).exp()
                    }
                };
                clamp_magnitude(scaled, max_accel)
            }
            FieldLaw::Vortex {
                swirl,
                radius,
                spin,
                max_accel,
            } => {
                if radius.abs() < DEGENERATE_RADIUS {
                    return Vec2::ZERO;
                }
                let falloff = (-r.length_squared() / (radius * radius)).exp();
                clamp_magnitude(velocity.perp() * (spin.sign() * swirl * falloff), max_accel)
            }
        }
    }
}

/// A placed field source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSource {
    pub id: SourceId,
    pub position: Vec2,
    pub law: FieldLaw,
    /// Disabled sources stay registered but contribute nothing
    pub enabled: bool,
}

impl FieldSource {
    pub fn new(id: SourceId, position: Vec2, law: FieldLaw) -> Self {
        Self {
            id,
            position,
            law,
            enabled: true,
        }
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.law.kind()
    }

    /// Acceleration this source applies at `position` for a body moving at `velocity`
    #[inline]
    pub fn acceleration_at(&self, position: Vec2, velocity: Vec2) -> Vec2 {
        self.law.acceleration(self.position - position, velocity)
    }

    /// True for an enabled, attracting point source whose body overlaps a hull
    /// of `hull_radius` at `position`. Repulsors are never lethal.
    pub fn is_lethal_contact(&self, position: Vec2, hull_radius: f32) -> bool {
        match self.law {
            FieldLaw::Attractor {
                strength,
                contact_radius,
                ..
            } if self.enabled && strength > 0.0 => {
                let reach = contact_radius + hull_radius;
                self.position.distance_squared(position) <= reach * reach
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attractor(strength: f32) -> FieldLaw {
        FieldLaw::Attractor {
            strength,
            softening: 0.3,
            max_accel: 9.0,
            contact_radius: 0.5,
        }
    }

    #[test]
    fn test_attractor_reference_value() {
        let source = FieldSource::new(SourceId(1), Vec2::ZERO, attractor(12.0));
        let a = source.acceleration_at(Vec2::new(3.0, 0.0), Vec2::ZERO);

        let expected = 12.0 * 3.0 / 9.3_f32.powf(1.5);
        assert!((a.length() - expected).abs() < 1e-4, "got {}", a.length());
        assert!((expected - 1.27).abs() < 0.01);
        assert!(a.x < 0.0 && a.y.abs() < 1e-6, "should point toward origin: {a:?}");
    }

    #[test]
    fn test_repulsor_points_away() {
        let source = FieldSource::new(SourceId(1), Vec2::ZERO, attractor(-12.0));
        let sample = Vec2::new(1.0, 2.0);
        let a = source.acceleration_at(sample, Vec2::ZERO);
        assert!(a.dot(sample) > 0.0);
    }

    #[test]
    fn test_attractor_at_center_is_zero() {
        let source = FieldSource::new(SourceId(1), Vec2::new(2.0, 2.0), attractor(12.0));
        let a = source.acceleration_at(Vec2::new(2.0, 2.0), Vec2::ZERO);
        assert_eq!(a, Vec2::ZERO);
    }

    #[test]
    fn test_attractor_clamps_near_core() {
        let source = FieldSource::new(SourceId(1), Vec2::ZERO, attractor(500.0));
        let a = source.acceleration_at(Vec2::new(0.3, 0.0), Vec2::ZERO);
        assert!((a.length() - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_stabilizer_pulls_in_and_fades() {
        let law = FieldLaw::Stabilizer {
            depth: 4.0,
            radius: 2.0,
            max_accel: 9.0,
        };
        let source = FieldSource::new(SourceId(1), Vec2::ZERO, law);

        let near = source.acceleration_at(Vec2::new(1.0, 0.0), Vec2::ZERO);
        assert!(near.x < 0.0);
        // (2*4/4) * e^(-1/4) * 1
        assert!((near.length() - 2.0 * (-0.25_f32).exp()).abs() < 1e-5);

        let far = source.acceleration_at(Vec2::new(20.0, 0.0), Vec2::ZERO);
        assert!(far.length() < 1e-6);
    }

    #[test]
    fn test_patch_hard_edge() {
        let law = FieldLaw::Patch {
            accel: Vec2::new(0.0, -2.0),
            radius: 3.0,
            edge: PatchEdge::Hard,
            max_accel: 9.0,
        };
        let source = FieldSource::new(SourceId(1), Vec2::ZERO, law);
        assert_eq!(
            source.acceleration_at(Vec2::new(2.9, 0.0), Vec2::ZERO),
            Vec2::new(0.0, -2.0)
        );
        assert_eq!(source.acceleration_at(Vec2::new(3.1, 0.0), Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_patch_soft_edge() {
        let law = FieldLaw::Patch {
            accel: Vec2::new(2.0, 0.0),
            radius: 1.0,
            edge: PatchEdge::Soft,
            max_accel: 9.0,
        };
        let source = FieldSource::new(SourceId(1), Vec2::ZERO, law);
        assert_eq!(source.acceleration_at(Vec2::ZERO, Vec2::ZERO), Vec2::new(2.0, 0.0));
        let edge = source.acceleration_at(Vec2::new(1.0, 0.0), Vec2::ZERO);
        assert!((edge.x - 2.0 * (-1.0_f32).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_patch_clamped_to_max() {
        let law = FieldLaw::Patch {
            accel: Vec2::new(30.0, 40.0),
            radius: 5.0,
            edge: PatchEdge::Hard,
            max_accel: 10.0,
        };
        let a = law.acceleration(Vec2::ZERO, Vec2::ZERO);
        assert!((a.length() - 10.0).abs() < 1e-4);
        assert!((a.x / a.y - 0.75).abs() < 1e-5, "direction must be kept");
    }

    #[test]
    fn test_vortex_rotates_velocity() {
        let law = FieldLaw::Vortex {
            swirl: 2.0,
            radius: 3.0,
            spin: Spin::CounterClockwise,
            max_accel: 9.0,
        };
        let a = law.acceleration(Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!((a - Vec2::new(0.0, 2.0)).length() < 1e-6);

        let cw = FieldLaw::Vortex {
            swirl: 2.0,
            radius: 3.0,
            spin: Spin::Clockwise,
            max_accel: 9.0,
        };
        let b = cw.acceleration(Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!((b - Vec2::new(0.0, -2.0)).length() < 1e-6);
    }

    #[test]
    fn test_vortex_zero_velocity_is_zero() {
        let law = FieldLaw::Vortex {
            swirl: 5.0,
            radius: 3.0,
            spin: Spin::Clockwise,
            max_accel: 9.0,
        };
        assert_eq!(law.acceleration(Vec2::new(0.5, 0.5), Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_degenerate_radius_is_zero() {
        let law = FieldLaw::Stabilizer {
            depth: 1.0,
            radius: 0.0,
            max_accel: 9.0,
        };
        assert_eq!(law.acceleration(Vec2::ZERO, Vec2::ONE), Vec2::ZERO);
    }

    #[test]
    fn test_lethal_contact_only_for_attractors() {
        let planet = FieldSource::new(SourceId(1), Vec2::ZERO, attractor(12.0));
        assert!(planet.is_lethal_contact(Vec2::new(0.7, 0.0), 0.25));
        assert!(!planet.is_lethal_contact(Vec2::new(0.8, 0.0), 0.25));

        let repulsor = FieldSource::new(SourceId(2), Vec2::ZERO, attractor(-12.0));
        assert!(!repulsor.is_lethal_contact(Vec2::ZERO, 0.25));

        let mut disabled = planet.clone();
        disabled.enabled = false;
        assert!(!disabled.is_lethal_contact(Vec2::ZERO, 0.25));
    }

    #[test]
    fn test_law_json_shape() {
        let json = r#"{"law":"vortex","swirl":1.5,"radius":2.0,"spin":"clockwise","max_accel":9.0}"#;
        let law: FieldLaw = serde_json::from_str(json).unwrap();
        assert_eq!(law.kind(), FieldKind::Vortex);
        assert!(matches!(law, FieldLaw::Vortex { spin: Spin::Clockwise, .. }));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn coord() -> impl Strategy<Value = f32> {
            -50.0_f32..50.0
        }

        fn any_law() -> impl Strategy<Value = FieldLaw> {
            prop_oneof![
                (-200.0_f32..200.0, 0.01_f32..2.0, 0.5_f32..20.0).prop_map(|(s, e, m)| {
                    FieldLaw::Attractor {
                        strength: s,
                        softening: e,
                        max_accel: m,
                        contact_radius: 0.0,
                    }
                }),
                (-50.0_f32..50.0, 0.1_f32..10.0, 0.5_f32..20.0).prop_map(|(d, r, m)| {
                    FieldLaw::Stabilizer {
                        depth: d,
                        radius: r,
                        max_accel: m,
                    }
                }),
                (coord(), coord(), 0.1_f32..10.0, any::<bool>(), 0.5_f32..20.0).prop_map(
                    |(x, y, r, soft, m)| FieldLaw::Patch {
                        accel: Vec2::new(x, y),
                        radius: r,
                        edge: if soft { PatchEdge::Soft } else { PatchEdge::Hard },
                        max_accel: m,
                    }
                ),
                (-50.0_f32..50.0, 0.1_f32..10.0, any::<bool>(), 0.5_f32..20.0).prop_map(
                    |(w, r, cw, m)| FieldLaw::Vortex {
                        swirl: w,
                        radius: r,
                        spin: if cw { Spin::Clockwise } else { Spin::CounterClockwise },
                        max_accel: m,
                    }
                ),
            ]
        }

        fn max_of(law: &FieldLaw) -> f32 {
            match *law {
                FieldLaw::Attractor { max_accel, .. }
                | FieldLaw::Stabilizer { max_accel, .. }
                | FieldLaw::Patch { max_accel, .. }
                | FieldLaw::Vortex { max_accel, .. } => max_accel,
            }
        }

        proptest! {
            #[test]
            fn acceleration_never_exceeds_clamp(
                law in any_law(),
                rx in coord(), ry in coord(),
                vx in coord(), vy in coord(),
            ) {
                let a = law.acceleration(Vec2::new(rx, ry), Vec2::new(vx, vy));
                prop_assert!(a.is_finite());
                prop_assert!(a.length() <= max_of(&law) * (1.0 + 1e-5));
            }

            #[test]
            fn clamp_holds_at_source_center(law in any_law(), vx in coord(), vy in coord()) {
                let a = law.acceleration(Vec2::ZERO, Vec2::new(vx, vy));
                prop_assert!(a.is_finite());
                prop_assert!(a.length() <= max_of(&law) * (1.0 + 1e-5));
            }

            #[test]
            fn strength_sign_sets_direction(
                strength in 0.1_f32..200.0,
                rx in coord(), ry in coord(),
            ) {
                let r = Vec2::new(rx, ry);
                prop_assume!(r.length() > 1e-3);
                let pull = attractor(strength).acceleration(r, Vec2::ZERO);
                let push = attractor(-strength).acceleration(r, Vec2::ZERO);
                // r points from the sample toward the source
                prop_assert!(pull.dot(r) > 0.0);
                prop_assert!(push.dot(r) < 0.0);
            }

            #[test]
            fn vortex_is_perpendicular_to_velocity(
                swirl in -50.0_f32..50.0,
                radius in 0.1_f32..10.0,
                rx in coord(), ry in coord(),
                vx in coord(), vy in coord(),
            ) {
                let law = FieldLaw::Vortex {
                    swirl,
                    radius,
                    spin: Spin::CounterClockwise,
                    max_accel: 9.0,
                };
                let v = Vec2::new(vx, vy);
                let a = law.acceleration(Vec2::new(rx, ry), v);
                let tolerance = 1e-4 * a.length() * v.length() + 1e-6;
                prop_assert!(a.dot(v).abs() <= tolerance);
            }
        }
    }
}
