//! Field registry: the session's set of active field sources
//!
//! Sources are bucketed by [`FieldKind`] and kept in id order so aggregation
//! is deterministic for a given registry content.

use std::collections::BTreeMap;

use glam::Vec2;

use super::field::{FieldKind, FieldSource, SourceId};

/// All field sources taking part in the simulation
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    buckets: [BTreeMap<SourceId, FieldSource>; 4],
    next_id: u32,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a source that is about to be created
    pub fn next_source_id(&mut self) -> SourceId {
        self.next_id += 1;
        SourceId(self.next_id)
    }

    /// Add a source. Returns false (and changes nothing) if its id is already registered.
    pub fn register(&mut self, source: FieldSource) -> bool {
        if self.contains(source.id) {
            return false;
        }
        // Keep allocation ahead of externally chosen ids
        self.next_id = self.next_id.max(source.id.0);
        log::debug!("Registered {:?} source {:?}", source.kind(), source.id);
        self.buckets[source.kind().index()].insert(source.id, source);
        true
    }

    /// Remove a source, handing it back to the caller. Unknown ids are ignored.
    pub fn unregister(&mut self, id: SourceId) -> Option<FieldSource> {
        let removed = self
            .buckets
            .iter_mut()
            .find_map(|bucket| bucket.remove(&id));
        if removed.is_some() {
            log::debug!("Unregistered source {:?}", id);
        }
        removed
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.buckets.iter().any(|bucket| bucket.contains_key(&id))
    }

    pub fn get(&self, id: SourceId) -> Option<&FieldSource> {
        self.buckets.iter().find_map(|bucket| bucket.get(&id))
    }

    fn get_mut(&mut self, id: SourceId) -> Option<&mut FieldSource> {
        self.buckets.iter_mut().find_map(|bucket| bucket.get_mut(&id))
    }

    /// Toggle a source without unregistering it. Returns false if the id is unknown.
    pub fn set_enabled(&mut self, id: SourceId, enabled: bool) -> bool {
        match self.get_mut(id) {
            Some(source) => {
                source.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Move a source attached to a moving anchor. Returns false if the id is unknown.
    pub fn set_position(&mut self, id: SourceId, position: Vec2) -> bool {
        match self.get_mut(id) {
            Some(source) => {
                source.position = position;
                true
            }
            None => false,
        }
    }

    /// Sources of one kind, in id order
    pub fn of_kind(&self, kind: FieldKind) -> impl Iterator<Item = &FieldSource> {
        self.buckets[kind.index()].values()
    }

    /// Every registered source (enabled or not), bucket by bucket in id order
    pub fn iter(&self) -> impl Iterator<Item = &FieldSource> {
        self.buckets.iter().flat_map(|bucket| bucket.values())
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(BTreeMap::is_empty)
    }

    /// Drop every source (level teardown). Id allocation keeps counting.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Net acceleration from every enabled source.
    ///
    /// `time` is accepted for time-varying fields; no current law reads it.
    pub fn acceleration_at(&self, position: Vec2, velocity: Vec2, _time: f32) -> Vec2 {
        self.iter()
            .filter(|source| source.enabled)
            .fold(Vec2::ZERO, |acc, source| {
                acc + source.acceleration_at(position, velocity)
            })
    }

    /// First enabled attracting source in contact with a hull at `position`
    pub fn lethal_contact(&self, position: Vec2, hull_radius: f32) -> Option<&FieldSource> {
        self.of_kind(FieldKind::Attractor)
            .find(|source| source.is_lethal_contact(position, hull_radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field::{FieldLaw, PatchEdge, Spin};

    fn attractor(id: u32, pos: Vec2, strength: f32) -> FieldSource {
        FieldSource::new(
            SourceId(id),
            pos,
            FieldLaw::Attractor {
                strength,
                softening: 0.3,
                max_accel: 9.0,
                contact_radius: 0.5,
            },
        )
    }

    fn patch(id: u32) -> FieldSource {
        FieldSource::new(
            SourceId(id),
            Vec2::ZERO,
            FieldLaw::Patch {
                accel: Vec2::new(1.0, 0.0),
                radius: 100.0,
                edge: PatchEdge::Hard,
                max_accel: 9.0,
            },
        )
    }

    #[test]
    fn test_empty_registry_is_zero() {
        let registry = FieldRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.acceleration_at(Vec2::new(1.0, 2.0), Vec2::ONE, 0.0),
            Vec2::ZERO
        );
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = FieldRegistry::new();
        assert!(registry.register(patch(1)));
        assert!(!registry.register(patch(1)));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.acceleration_at(Vec2::ZERO, Vec2::ZERO, 0.0),
            Vec2::new(1.0, 0.0)
        );
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = FieldRegistry::new();
        registry.register(patch(1));
        assert!(registry.unregister(SourceId(1)).is_some());
        assert!(registry.unregister(SourceId(1)).is_none());
        assert!(registry.unregister(SourceId(99)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_disabled_sources_are_skipped() {
        let mut registry = FieldRegistry::new();
        registry.register(patch(1));
        registry.register(patch(2));
        assert!(registry.set_enabled(SourceId(2), false));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.acceleration_at(Vec2::ZERO, Vec2::ZERO, 0.0),
            Vec2::new(1.0, 0.0)
        );
        assert!(!registry.set_enabled(SourceId(7), false));
    }

    #[test]
    fn test_sums_across_kinds() {
        let mut registry = FieldRegistry::new();
        registry.register(patch(1));
        registry.register(FieldSource::new(
            SourceId(2),
            Vec2::ZERO,
            FieldLaw::Vortex {
                swirl: 1.0,
                radius: 100.0,
                spin: Spin::CounterClockwise,
                max_accel: 9.0,
            },
        ));
        let a = registry.acceleration_at(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.0);
        assert!((a - Vec2::new(1.0, 1.0)).length() < 1e-6);
        assert_eq!(registry.of_kind(FieldKind::Vortex).count(), 1);
        assert_eq!(registry.of_kind(FieldKind::Patch).count(), 1);
    }

    #[test]
    fn test_set_position_moves_source() {
        let mut registry = FieldRegistry::new();
        registry.register(attractor(1, Vec2::ZERO, 12.0));
        registry.set_position(SourceId(1), Vec2::new(10.0, 0.0));
        let a = registry.acceleration_at(Vec2::new(7.0, 0.0), Vec2::ZERO, 0.0);
        assert!(a.x > 0.0);
    }

    #[test]
    fn test_next_source_id_skips_registered() {
        let mut registry = FieldRegistry::new();
        registry.register(patch(5));
        assert_eq!(registry.next_source_id(), SourceId(6));
        assert_eq!(registry.next_source_id(), SourceId(7));
    }

    #[test]
    fn test_lethal_contact_ignores_repulsors() {
        let mut registry = FieldRegistry::new();
        registry.register(attractor(1, Vec2::ZERO, -12.0));
        assert!(registry.lethal_contact(Vec2::ZERO, 0.2).is_none());
        registry.register(attractor(2, Vec2::new(5.0, 0.0), 12.0));
        let hit = registry.lethal_contact(Vec2::new(5.2, 0.0), 0.2);
        assert_eq!(hit.map(|s| s.id), Some(SourceId(2)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn aggregation_independent_of_registration_order(
                samples in prop::collection::vec((-10.0_f32..10.0, -10.0_f32..10.0, -30.0_f32..30.0), 1..12),
                px in -10.0_f32..10.0,
                py in -10.0_f32..10.0,
            ) {
                let sources: Vec<FieldSource> = samples
                    .iter()
                    .enumerate()
                    .map(|(i, &(x, y, s))| attractor(i as u32 + 1, Vec2::new(x, y), s))
                    .collect();

                let mut forward = FieldRegistry::new();
                for source in &sources {
                    forward.register(source.clone());
                }
                let mut backward = FieldRegistry::new();
                for source in sources.iter().rev() {
                    backward.register(source.clone());
                }

                let p = Vec2::new(px, py);
                let a = forward.acceleration_at(p, Vec2::ZERO, 0.0);
                let b = backward.acceleration_at(p, Vec2::ZERO, 0.0);
                // Same content iterates in the same order, so the sums are bit-identical
                prop_assert_eq!(a, b);

                let naive = sources
                    .iter()
                    .rev()
                    .fold(Vec2::ZERO, |acc, s| acc + s.acceleration_at(p, Vec2::ZERO));
                prop_assert!((a - naive).length() <= 1e-3 * (1.0 + naive.length()));
            }
        }
    }
}
