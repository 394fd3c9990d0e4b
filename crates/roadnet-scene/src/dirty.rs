//! Dirty entity tracking for incremental export

use crate::entity::EntityKey;
use indexmap::IndexSet;

/// Keys touched since the last export, in the order they were first marked.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty: IndexSet<EntityKey>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, key: EntityKey) {
        self.dirty.insert(key);
    }

    pub fn mark_all(&mut self, keys: impl IntoIterator<Item = EntityKey>) {
        self.dirty.extend(keys);
    }

    pub fn clear_dirty(&mut self, key: EntityKey) -> bool {
        self.dirty.shift_remove(&key)
    }

    /// Take every dirty key, leaving the tracker empty.
    pub fn drain_dirty(&mut self) -> Vec<EntityKey> {
        self.dirty.drain(..).collect()
    }

    pub fn is_dirty(&self, key: EntityKey) -> bool {
        self.dirty.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnet_core::EntityId;

    #[test]
    fn test_mark_and_drain_keeps_first_mark_order() {
        let a = EntityKey::road(EntityId::from_raw(1));
        let b = EntityKey::junction(EntityId::from_raw(2));
        let mut tracker = DirtyTracker::new();
        tracker.mark_dirty(b);
        tracker.mark_dirty(a);
        tracker.mark_dirty(b);
        assert_eq!(tracker.len(), 2);
        assert!(tracker.is_dirty(a));

        assert_eq!(tracker.drain_dirty(), vec![b, a]);
        assert!(tracker.is_empty());
        assert!(tracker.drain_dirty().is_empty());
    }

    #[test]
    fn test_clear_dirty() {
        let a = EntityKey::signal(EntityId::from_raw(5));
        let mut tracker = DirtyTracker::new();
        tracker.mark_all([a]);
        assert!(tracker.clear_dirty(a));
        assert!(!tracker.clear_dirty(a));
        assert!(!tracker.is_dirty(a));
    }
}
