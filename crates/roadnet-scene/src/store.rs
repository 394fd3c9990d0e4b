//! SceneStore - keyed entity collections

use crate::category::{EntityCategory, EntityKind, RoadCategory};
use crate::entity::{Entity, EntityKey, Junction, Road, Signal};
use roadnet_core::{EntityId, Result, RoadError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Roads, junctions and signals keyed by id.
///
/// Lookups return `None` for unknown ids and never fail; callers decide
/// whether a stale id is an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneStore {
    roads: BTreeMap<EntityId, Road>,
    junctions: BTreeMap<EntityId, Junction>,
    signals: BTreeMap<EntityId, Signal>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Roads

    pub fn insert_road(&mut self, road: Road) -> Result<()> {
        if self.roads.contains_key(&road.id) {
            return Err(RoadError::DuplicateEntity(road.key().to_string()));
        }
        EntityId::reserve(road.id);
        self.roads.insert(road.id, road);
        Ok(())
    }

    pub fn remove_road(&mut self, id: EntityId) -> Option<Road> {
        self.roads.remove(&id)
    }

    pub fn road(&self, id: EntityId) -> Option<&Road> {
        self.roads.get(&id)
    }

    pub fn road_mut(&mut self, id: EntityId) -> Option<&mut Road> {
        self.roads.get_mut(&id)
    }

    /// Resolve a road by id and category. A road of another category is
    /// reported the same as a missing one.
    pub fn find_road(&self, id: EntityId, category: RoadCategory) -> Option<&Road> {
        self.roads.get(&id).filter(|road| road.category == category)
    }

    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.values()
    }

    // Junctions

    pub fn insert_junction(&mut self, junction: Junction) -> Result<()> {
        if self.junctions.contains_key(&junction.id) {
            return Err(RoadError::DuplicateEntity(junction.key().to_string()));
        }
        EntityId::reserve(junction.id);
        self.junctions.insert(junction.id, junction);
        Ok(())
    }

    pub fn remove_junction(&mut self, id: EntityId) -> Option<Junction> {
        self.junctions.remove(&id)
    }

    pub fn junction(&self, id: EntityId) -> Option<&Junction> {
        self.junctions.get(&id)
    }

    pub fn junction_mut(&mut self, id: EntityId) -> Option<&mut Junction> {
        self.junctions.get_mut(&id)
    }

    pub fn junctions(&self) -> impl Iterator<Item = &Junction> {
        self.junctions.values()
    }

    // Signals

    pub fn insert_signal(&mut self, signal: Signal) -> Result<()> {
        if self.signals.contains_key(&signal.id) {
            return Err(RoadError::DuplicateEntity(signal.key().to_string()));
        }
        EntityId::reserve(signal.id);
        self.signals.insert(signal.id, signal);
        Ok(())
    }

    pub fn remove_signal(&mut self, id: EntityId) -> Option<Signal> {
        self.signals.remove(&id)
    }

    pub fn signal(&self, id: EntityId) -> Option<&Signal> {
        self.signals.get(&id)
    }

    pub fn signal_mut(&mut self, id: EntityId) -> Option<&mut Signal> {
        self.signals.get_mut(&id)
    }

    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    // Generic access

    /// Category of the entity behind `key`, if it exists.
    pub fn category_of(&self, key: EntityKey) -> Option<EntityCategory> {
        match key.kind {
            EntityKind::Road => self
                .roads
                .get(&key.id)
                .map(|road| EntityCategory::Road(road.category)),
            EntityKind::Junction => self
                .junctions
                .contains_key(&key.id)
                .then_some(EntityCategory::Junction),
            EntityKind::Signal => self
                .signals
                .contains_key(&key.id)
                .then_some(EntityCategory::Signal),
        }
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.category_of(key).is_some()
    }

    /// Owned copy of the entity behind `key`.
    pub fn snapshot(&self, key: EntityKey) -> Option<Entity> {
        match key.kind {
            EntityKind::Road => self.roads.get(&key.id).cloned().map(Entity::Road),
            EntityKind::Junction => self.junctions.get(&key.id).cloned().map(Entity::Junction),
            EntityKind::Signal => self.signals.get(&key.id).cloned().map(Entity::Signal),
        }
    }

    /// Put `key` back to a snapshot: `None` removes the entity, `Some`
    /// replaces or inserts it.
    pub fn restore(&mut self, key: EntityKey, snapshot: Option<Entity>) {
        match snapshot {
            None => match key.kind {
                EntityKind::Road => {
                    self.roads.remove(&key.id);
                }
                EntityKind::Junction => {
                    self.junctions.remove(&key.id);
                }
                EntityKind::Signal => {
                    self.signals.remove(&key.id);
                }
            },
            Some(Entity::Road(road)) => {
                self.roads.insert(road.id, road);
            }
            Some(Entity::Junction(junction)) => {
                self.junctions.insert(junction.id, junction);
            }
            Some(Entity::Signal(signal)) => {
                self.signals.insert(signal.id, signal);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.roads.len() + self.junctions.len() + self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnet_core::Vec3;
    use roadnet_curve::ReferenceLine;

    fn road(id: u64, category: RoadCategory) -> Road {
        let reference = ReferenceLine {
            catmull: vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)],
            serie: vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)],
            catmull_indices: vec![0, 1],
            tangents: vec![Vec3::new(1.0, 0.0, 0.0); 2],
        };
        Road::new(EntityId::from_raw(id), category, reference)
    }

    #[test]
    fn test_find_by_id_and_category() {
        let mut store = SceneStore::new();
        store.insert_road(road(10, RoadCategory::TwoStraightLine)).unwrap();

        let id = EntityId::from_raw(10);
        assert!(store.find_road(id, RoadCategory::TwoStraightLine).is_some());
        assert!(store.find_road(id, RoadCategory::CatmullSerie).is_none());
        assert!(store.find_road(EntityId::from_raw(11), RoadCategory::TwoStraightLine).is_none());
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut store = SceneStore::new();
        store.insert_road(road(20, RoadCategory::CatmullSerie)).unwrap();
        let err = store
            .insert_road(road(20, RoadCategory::CatmullSerie))
            .unwrap_err();
        assert!(matches!(err, RoadError::DuplicateEntity(_)));
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut store = SceneStore::new();
        store.insert_road(road(30, RoadCategory::TwoStraightLine)).unwrap();
        let key = EntityKey::road(EntityId::from_raw(30));

        let before = store.clone();
        let snap = store.snapshot(key);
        assert!(snap.is_some());

        store.restore(key, None);
        assert!(!store.contains(key));
        assert!(store.is_empty());

        store.restore(key, snap);
        assert_eq!(store, before);
    }

    #[test]
    fn test_removed_entity_resolves_to_none() {
        let mut store = SceneStore::new();
        store.insert_road(road(40, RoadCategory::TwoStraightLine)).unwrap();
        let id = EntityId::from_raw(40);
        assert!(store.remove_road(id).is_some());
        assert!(store.road(id).is_none());
        assert!(store.remove_road(id).is_none());
        assert_eq!(store.category_of(EntityKey::road(id)), None);
    }

    #[test]
    fn test_inserting_with_explicit_id_moves_the_counter() {
        let mut store = SceneStore::new();
        store.insert_road(road(1_000_000, RoadCategory::TwoStraightLine)).unwrap();
        assert!(EntityId::new().raw() > 1_000_000);
    }
}
