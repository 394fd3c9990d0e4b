//! Journaled store access for edit behaviors
//!
//! Behaviors never touch the store directly. Every mutable access goes
//! through `EditContext`, which snapshots an entity the first time it is
//! touched so the edit can be rolled back or reversed exactly.

use indexmap::IndexMap;
use roadnet_core::{EntityId, Result, RoadError};
use roadnet_curve::CurveEngine;
use roadnet_scene::{Entity, EntityKey, Junction, Road, SceneStore, Signal};

/// Snapshots keyed by entity, `None` for an entity that did not exist.
pub type Snapshots = IndexMap<EntityKey, Option<Entity>>;

/// First-touch snapshots of every entity an edit changed.
#[derive(Debug, Default)]
pub struct Journal {
    before: Snapshots,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, store: &SceneStore, key: EntityKey) {
        if !self.before.contains_key(&key) {
            self.before.insert(key, store.snapshot(key));
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.before.keys()
    }

    /// Current state of every touched key.
    pub fn capture(&self, store: &SceneStore) -> Snapshots {
        self.before
            .keys()
            .map(|key| (*key, store.snapshot(*key)))
            .collect()
    }

    /// Put every touched key back the way it was.
    pub fn rollback(&self, store: &mut SceneStore) {
        restore_all(store, &self.before);
    }

    pub fn into_snapshots(self) -> Snapshots {
        self.before
    }
}

pub fn restore_all(store: &mut SceneStore, snapshots: &Snapshots) {
    for (key, snapshot) in snapshots {
        store.restore(*key, snapshot.clone());
    }
}

fn not_found(key: EntityKey) -> RoadError {
    RoadError::EntityNotFound(key.to_string())
}

pub struct EditContext<'a> {
    store: &'a mut SceneStore,
    engine: &'a CurveEngine,
    journal: &'a mut Journal,
}

impl<'a> EditContext<'a> {
    pub fn new(store: &'a mut SceneStore, engine: &'a CurveEngine, journal: &'a mut Journal) -> Self {
        Self {
            store,
            engine,
            journal,
        }
    }

    pub fn engine(&self) -> &'a CurveEngine {
        self.engine
    }

    /// Read-only view of the store. Reads are not journaled.
    pub fn store(&self) -> &SceneStore {
        self.store
    }

    fn touch(&mut self, key: EntityKey) {
        self.journal.record(self.store, key);
    }

    pub fn road(&self, id: EntityId) -> Result<&Road> {
        self.store.road(id).ok_or_else(|| not_found(EntityKey::road(id)))
    }

    pub fn road_mut(&mut self, id: EntityId) -> Result<&mut Road> {
        let key = EntityKey::road(id);
        if !self.store.contains(key) {
            return Err(not_found(key));
        }
        self.touch(key);
        self.store.road_mut(id).ok_or_else(|| not_found(key))
    }

    pub fn insert_road(&mut self, road: Road) -> Result<()> {
        self.touch(road.key());
        self.store.insert_road(road)
    }

    pub fn remove_road(&mut self, id: EntityId) -> Result<Road> {
        let key = EntityKey::road(id);
        self.touch(key);
        self.store.remove_road(id).ok_or_else(|| not_found(key))
    }

    pub fn junction(&self, id: EntityId) -> Result<&Junction> {
        self.store
            .junction(id)
            .ok_or_else(|| not_found(EntityKey::junction(id)))
    }

    pub fn junction_mut(&mut self, id: EntityId) -> Result<&mut Junction> {
        let key = EntityKey::junction(id);
        if !self.store.contains(key) {
            return Err(not_found(key));
        }
        self.touch(key);
        self.store.junction_mut(id).ok_or_else(|| not_found(key))
    }

    pub fn insert_junction(&mut self, junction: Junction) -> Result<()> {
        self.touch(junction.key());
        self.store.insert_junction(junction)
    }

    pub fn remove_junction(&mut self, id: EntityId) -> Result<Junction> {
        let key = EntityKey::junction(id);
        self.touch(key);
        self.store.remove_junction(id).ok_or_else(|| not_found(key))
    }

    pub fn signal(&self, id: EntityId) -> Result<&Signal> {
        self.store
            .signal(id)
            .ok_or_else(|| not_found(EntityKey::signal(id)))
    }

    pub fn signal_mut(&mut self, id: EntityId) -> Result<&mut Signal> {
        let key = EntityKey::signal(id);
        if !self.store.contains(key) {
            return Err(not_found(key));
        }
        self.touch(key);
        self.store.signal_mut(id).ok_or_else(|| not_found(key))
    }

    pub fn insert_signal(&mut self, signal: Signal) -> Result<()> {
        self.touch(signal.key());
        self.store.insert_signal(signal)
    }

    pub fn remove_signal(&mut self, id: EntityId) -> Result<Signal> {
        let key = EntityKey::signal(id);
        self.touch(key);
        self.store.remove_signal(id).ok_or_else(|| not_found(key))
    }
}
