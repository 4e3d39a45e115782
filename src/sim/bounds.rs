//! Rectangular play region (camera view plus margin)

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle; bodies outside it are lost or cleaned up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Camera view centered at `center` with `half_extents`, grown by `margin` on every side
    pub fn from_view(center: Vec2, half_extents: Vec2, margin: f32) -> Self {
        let half = half_extents.abs() + Vec2::splat(margin.max(0.0));
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}
