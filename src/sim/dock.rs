//! Docks: fixed acceptance points that turn docked probes into field sources
//!
//! A dock hosts at most one spawned source at a time and must be cleared
//! before it accepts another probe.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::{FieldLaw, FieldSource, PatchEdge, SourceId, Spin};
use super::probe::ProbeType;
use super::registry::FieldRegistry;
use crate::tuning::FieldDefaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DockId(pub u32);

/// Per-dock adjustments to the default law for a probe type.
/// Fields that do not apply to the law are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOverride {
    /// Attractor strength magnitude (the probe type decides the sign)
    pub strength: Option<f32>,
    pub softening: Option<f32>,
    pub contact_radius: Option<f32>,
    /// Stabilizer well depth
    pub depth: Option<f32>,
    /// Stabilizer, patch or vortex radius
    pub radius: Option<f32>,
    /// Patch vector
    pub accel: Option<Vec2>,
    pub edge: Option<PatchEdge>,
    /// Vortex strength
    pub swirl: Option<f32>,
    pub spin: Option<Spin>,
    pub max_accel: Option<f32>,
}

impl FieldOverride {
    pub fn apply(&self, law: FieldLaw) -> FieldLaw {
        match law {
            FieldLaw::Attractor {
                strength,
                softening,
                max_accel,
                contact_radius,
            } => FieldLaw::Attractor {
                strength: self
                    .strength
                    .map_or(strength, |s| s.abs().copysign(strength)),
                softening: self.softening.unwrap_or(softening),
                max_accel: self.max_accel.unwrap_or(max_accel),
                contact_radius: self.contact_radius.unwrap_or(contact_radius),
            },
            FieldLaw::Stabilizer {
                depth,
                radius,
                max_accel,
            } => FieldLaw::Stabilizer {
                depth: self.depth.unwrap_or(depth),
                radius: self.radius.unwrap_or(radius),
                max_accel: self.max_accel.unwrap_or(max_accel),
            },
            FieldLaw::Patch {
                accel,
                radius,
                edge,
                max_accel,
            } => FieldLaw::Patch {
                accel: self.accel.unwrap_or(accel),
                radius: self.radius.unwrap_or(radius),
                edge: self.edge.unwrap_or(edge),
                max_accel: self.max_accel.unwrap_or(max_accel),
            },
            FieldLaw::Vortex {
                swirl,
                radius,
                spin,
                max_accel,
            } => FieldLaw::Vortex {
                swirl: self.swirl.unwrap_or(swirl),
                radius: self.radius.unwrap_or(radius),
                spin: self.spin.unwrap_or(spin),
                max_accel: self.max_accel.unwrap_or(max_accel),
            },
        }
    }
}

/// A probe acceptance point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dock {
    pub id: DockId,
    pub position: Vec2,
    pub snap_radius: f32,
    pub accepted: BTreeSet<ProbeType>,
    pub overrides: BTreeMap<ProbeType, FieldOverride>,
    /// Source currently hosted here
    anchor: Option<SourceId>,
}

impl Dock {
    pub fn new(
        id: DockId,
        position: Vec2,
        snap_radius: f32,
        accepted: impl IntoIterator<Item = ProbeType>,
    ) -> Self {
        Self {
            id,
            position,
            snap_radius,
            accepted: accepted.into_iter().collect(),
            overrides: BTreeMap::new(),
            anchor: None,
        }
    }

    pub fn with_override(mut self, probe_type: ProbeType, field: FieldOverride) -> Self {
        self.overrides.insert(probe_type, field);
        self
    }

    #[inline]
    pub fn accepts(&self, probe_type: ProbeType) -> bool {
        self.accepted.contains(&probe_type)
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<SourceId> {
        self.anchor
    }

    #[inline]
    pub fn in_range(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.snap_radius * self.snap_radius
    }

    /// Law this dock would spawn for `probe_type`, overrides applied
    pub fn law_for(&self, probe_type: ProbeType, defaults: &FieldDefaults) -> FieldLaw {
        let law = defaults.law_for(probe_type);
        match self.overrides.get(&probe_type) {
            Some(field) => field.apply(law),
            None => law,
        }
    }

    /// Spawn and register the field source for a docked probe.
    ///
    /// Returns `None` if the dock is occupied or does not accept the type.
    pub fn spawn_anchor_for(
        &mut self,
        probe_type: ProbeType,
        registry: &mut FieldRegistry,
        defaults: &FieldDefaults,
    ) -> Option<SourceId> {
        if self.is_occupied() || !self.accepts(probe_type) {
            return None;
        }
        let id = registry.next_source_id();
        let law = self.law_for(probe_type, defaults);
        registry.register(FieldSource::new(id, self.position, law));
        self.anchor = Some(id);
        log::info!(
            "Dock {:?} spawned {} source {:?}",
            self.id,
            probe_type.as_str(),
            id
        );
        Some(id)
    }

    /// Destroy the hosted source, freeing the dock
    pub fn clear_anchor(&mut self, registry: &mut FieldRegistry) -> Option<FieldSource> {
        let id = self.anchor.take()?;
        log::info!("Dock {:?} cleared source {:?}", self.id, id);
        registry.unregister(id)
    }
}

/// All docks of a level, kept in id order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockSet {
    docks: Vec<Dock>,
}

impl DockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dock, replacing any dock with the same id
    pub fn add(&mut self, dock: Dock) {
        match self.docks.binary_search_by_key(&dock.id, |d| d.id) {
            Ok(i) => self.docks[i] = dock,
            Err(i) => self.docks.insert(i, dock),
        }
    }

    pub fn get(&self, id: DockId) -> Option<&Dock> {
        self.docks
            .binary_search_by_key(&id, |d| d.id)
            .ok()
            .map(|i| &self.docks[i])
    }

    pub fn get_mut(&mut self, id: DockId) -> Option<&mut Dock> {
        self.docks
            .binary_search_by_key(&id, |d| d.id)
            .ok()
            .map(|i| &mut self.docks[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dock> {
        self.docks.iter()
    }

    pub fn len(&self) -> usize {
        self.docks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docks.is_empty()
    }

    /// Nearest free dock in range that accepts `probe_type` (lower id wins ties)
    pub fn find_match(&self, point: Vec2, probe_type: ProbeType) -> Option<DockId> {
        self.docks
            .iter()
            .filter(|d| !d.is_occupied() && d.accepts(probe_type) && d.in_range(point))
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
                    .then(a.id.cmp(&b.id))
            })
            .map(|d| d.id)
    }

    /// Clear every dock, unregistering their sources. Returns how many were occupied.
    pub fn clear_all_docks(&mut self, registry: &mut FieldRegistry) -> usize {
        self.docks
            .iter_mut()
            .filter_map(|d| d.clear_anchor(registry))
            .count()
    }

    /// Drop all docks (level teardown); their sources are cleared first
    pub fn reset(&mut self, registry: &mut FieldRegistry) {
        self.clear_all_docks(registry);
        self.docks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        let dock = Dock::new(
            DockId(1),
            Vec2::ZERO,
            0.5,
            [ProbeType::Attractor, ProbeType::Patch],
        );
        assert!(dock.accepts(ProbeType::Attractor));
        assert!(dock.accepts(ProbeType::Patch));
        assert!(!dock.accepts(ProbeType::Vortex));
    }

    #[test]
    fn test_spawn_then_clear() {
        let defaults = FieldDefaults::default();
        let mut registry = FieldRegistry::new();
        let mut dock = Dock::new(DockId(1), Vec2::new(1.0, 1.0), 0.5, ProbeType::ALL);

        let id = dock.spawn_anchor_for(ProbeType::Stabilizer, &mut registry, &defaults);
        assert!(id.is_some());
        assert!(dock.is_occupied());
        assert_eq!(registry.len(), 1);

        // Occupied docks refuse a second source
        assert!(
            dock.spawn_anchor_for(ProbeType::Stabilizer, &mut registry, &defaults)
                .is_none()
        );
        assert_eq!(registry.len(), 1);

        let removed = dock.clear_anchor(&mut registry);
        assert_eq!(removed.map(|s| s.id), id);
        assert!(!dock.is_occupied());
        assert!(registry.is_empty());
        assert!(dock.clear_anchor(&mut registry).is_none());
    }

    #[test]
    fn test_spawn_refused_for_unaccepted_type() {
        let defaults = FieldDefaults::default();
        let mut registry = FieldRegistry::new();
        let mut dock = Dock::new(DockId(1), Vec2::ZERO, 0.5, [ProbeType::Vortex]);
        assert!(
            dock.spawn_anchor_for(ProbeType::Attractor, &mut registry, &defaults)
                .is_none()
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_override_applied_to_spawned_law() {
        let defaults = FieldDefaults::default();
        let mut registry = FieldRegistry::new();
        let mut dock = Dock::new(DockId(1), Vec2::ZERO, 0.5, [ProbeType::Repulsor])
            .with_override(
                ProbeType::Repulsor,
                FieldOverride {
                    strength: Some(30.0),
                    ..Default::default()
                },
            );
        let id = dock
            .spawn_anchor_for(ProbeType::Repulsor, &mut registry, &defaults)
            .unwrap();
        match registry.get(id).map(|s| s.law) {
            Some(FieldLaw::Attractor { strength, .. }) => assert_eq!(strength, -30.0),
            other => panic!("unexpected law {other:?}"),
        }
    }

    #[test]
    fn test_find_match_nearest_first() {
        let mut docks = DockSet::new();
        docks.add(Dock::new(DockId(2), Vec2::new(0.4, 0.0), 1.0, ProbeType::ALL));
        docks.add(Dock::new(DockId(1), Vec2::new(-0.6, 0.0), 1.0, ProbeType::ALL));
        assert_eq!(docks.find_match(Vec2::ZERO, ProbeType::Patch), Some(DockId(2)));

        // Equal distance falls back to id order
        docks.add(Dock::new(DockId(3), Vec2::new(-0.4, 0.0), 1.0, ProbeType::ALL));
        assert_eq!(docks.find_match(Vec2::ZERO, ProbeType::Patch), Some(DockId(2)));
        docks.add(Dock::new(DockId(0), Vec2::new(0.0, 0.4), 1.0, ProbeType::ALL));
        assert_eq!(docks.find_match(Vec2::ZERO, ProbeType::Patch), Some(DockId(0)));
    }

    #[test]
    fn test_find_match_skips_occupied_and_out_of_range() {
        let defaults = FieldDefaults::default();
        let mut registry = FieldRegistry::new();
        let mut docks = DockSet::new();
        docks.add(Dock::new(DockId(1), Vec2::ZERO, 0.5, ProbeType::ALL));
        docks.add(Dock::new(DockId(2), Vec2::new(3.0, 0.0), 0.5, ProbeType::ALL));

        assert_eq!(docks.find_match(Vec2::new(1.0, 0.0), ProbeType::Patch), None);

        docks
            .get_mut(DockId(1))
            .and_then(|d| d.spawn_anchor_for(ProbeType::Patch, &mut registry, &defaults));
        assert_eq!(docks.find_match(Vec2::ZERO, ProbeType::Patch), None);
        assert_eq!(
            docks.find_match(Vec2::new(2.8, 0.0), ProbeType::Patch),
            Some(DockId(2))
        );
    }

    #[test]
    fn test_clear_all_docks() {
        let defaults = FieldDefaults::default();
        let mut registry = FieldRegistry::new();
        let mut docks = DockSet::new();
        for i in 0..3 {
            docks.add(Dock::new(DockId(i), Vec2::new(i as f32, 0.0), 0.2, ProbeType::ALL));
        }
        for i in 0..2 {
            docks
                .get_mut(DockId(i))
                .and_then(|d| d.spawn_anchor_for(ProbeType::Vortex, &mut registry, &defaults));
        }
        assert_eq!(registry.len(), 2);
        assert_eq!(docks.clear_all_docks(&mut registry), 2);
        assert!(registry.is_empty());
        assert!(docks.iter().all(|d| !d.is_occupied()));
        assert_eq!(docks.len(), 3);
    }
}
