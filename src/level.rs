//! Level layout
//!
//! Where the craft spawns, how far the play area reaches, which docks exist and
//! which field sources are placed up front. `par` is carried for scoring only.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::bounds::Bounds;
use crate::sim::dock::{Dock, DockId, FieldOverride};
use crate::sim::field::FieldLaw;
use crate::sim::probe::ProbeType;
use crate::tuning::{validate_law, validate_override};

fn default_snap_radius() -> f32 {
    0.35
}

fn default_enabled() -> bool {
    true
}

/// A dock as written in a level file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockConfig {
    pub position: Vec2,
    #[serde(default = "default_snap_radius")]
    pub snap_radius: f32,
    pub accepts: Vec<ProbeType>,
    #[serde(default)]
    pub overrides: BTreeMap<ProbeType, FieldOverride>,
}

impl DockConfig {
    pub fn build(&self, id: DockId) -> Dock {
        let mut dock = Dock::new(id, self.position, self.snap_radius, self.accepts.iter().copied());
        dock.overrides = self.overrides.clone();
        dock
    }
}

/// A field source placed directly in the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedSource {
    pub position: Vec2,
    pub law: FieldLaw,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Complete level description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    /// Opaque scoring target
    pub par: u32,
    pub spawn: Vec2,
    pub view_center: Vec2,
    pub view_half_extents: Vec2,
    /// Extra room around the view before bodies count as out of bounds
    pub margin: f32,
    pub docks: Vec<DockConfig>,
    pub sources: Vec<PlacedSource>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            name: "untitled".to_string(),
            par: 0,
            spawn: Vec2::new(0.0, -6.0),
            view_center: Vec2::ZERO,
            view_half_extents: Vec2::new(5.0, 9.0),
            margin: 1.0,
            docks: Vec::new(),
            sources: Vec::new(),
        }
    }
}

impl LevelConfig {
    /// Parse and validate a level from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Load a level from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level '{}' ({} docks, {} sources)",
            level.name,
            level.docks.len(),
            level.sources.len()
        );
        Ok(level)
    }

    /// Play area: camera view plus margin
    pub fn bounds(&self) -> Bounds {
        Bounds::from_view(self.view_center, self.view_half_extents, self.margin)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_half_extents.x <= 0.0 || self.view_half_extents.y <= 0.0 {
            return Err(ConfigError::invalid(
                "view_half_extents",
                "both extents must be positive",
            ));
        }
        if self.margin < 0.0 {
            return Err(ConfigError::invalid("margin", "must be non-negative"));
        }
        if !self.bounds().contains(self.spawn) {
            return Err(ConfigError::invalid("spawn", "must lie inside the play area"));
        }
        for (i, dock) in self.docks.iter().enumerate() {
            if dock.snap_radius <= 0.0 {
                return Err(ConfigError::invalid(
                    "docks.snap_radius",
                    format!("dock {i} has non-positive snap radius"),
                ));
            }
            if dock.accepts.is_empty() {
                return Err(ConfigError::invalid(
                    "docks.accepts",
                    format!("dock {i} accepts no probe types"),
                ));
            }
            for field in dock.overrides.values() {
                validate_override(field)?;
            }
        }
        for source in &self.sources {
            validate_law(&source.law)?;
        }
        Ok(())
    }
}
