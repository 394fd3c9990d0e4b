//! Road, junction and signal identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next id handed out by `EntityId::new`. Only ever moves forward.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a road, junction or signal in the scene store.
///
/// Payloads carry ids that were allocated before the edit ran, so the
/// same id comes back when a removed road is restored by undo or a
/// created one is replayed by redo. Links between entities (prev/next
/// road, junction membership, the road a signal sits on) hold ids and
/// resolve them through the store on every access, so a removed entity
/// degrades to "not found" instead of dangling.
///
/// Serialized as a bare integer, which is what replay scripts write.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Allocate an id no other entity in this process has been given.
    pub fn new() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an id that came from a script or a saved scene.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Called whenever the store takes an entity, so ids read from a
    /// script never collide with later allocations.
    pub fn reserve(id: EntityId) {
        let mut current = NEXT_ID.load(Ordering::Relaxed);
        while current <= id.0 {
            match NEXT_ID.compare_exchange_weak(
                current,
                id.0 + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(seen) => current = seen,
            }
        }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct ScriptLine {
        road: EntityId,
        next: Option<EntityId>,
    }

    #[test]
    fn test_fresh_roads_get_distinct_ids() {
        let ids: Vec<_> = (0..64).map(|_| EntityId::new()).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_script_ids_are_bare_integers() {
        let line: ScriptLine = toml::from_str("road = 42\nnext = 43").unwrap();
        assert_eq!(line.road, EntityId::from_raw(42));
        assert_eq!(line.next.map(|id| id.raw()), Some(43));
        assert_eq!(line.road.to_string(), "42");
        assert_eq!(format!("{:?}", line.road), "#42");
    }

    #[test]
    fn test_reserved_script_id_is_never_reallocated() {
        let scripted = EntityId::from_raw(5_000_000);
        EntityId::reserve(scripted);
        assert!(EntityId::new() > scripted);

        // Reserving an id below the counter leaves it alone.
        let fresh = EntityId::new();
        EntityId::reserve(EntityId::from_raw(3));
        assert!(EntityId::new() > fresh);
    }
}
