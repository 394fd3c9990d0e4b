//! Edit notifications for render and UI collaborators

use roadnet_scene::EntityKey;
use std::collections::HashMap;

/// Name of the event emitted when an edit is refused for folding lanes.
pub const INVALID_GEOMETRY_EVENT: &str = "InvokeInvalidGeometryEvent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditPhase {
    Commit,
    Undo,
    Redo,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent {
    /// e.g. `InvokeCreateTwoStraightLineRoadEvent`
    pub name: String,
    pub phase: EditPhase,
    pub keys: Vec<EntityKey>,
}

type Handler = Box<dyn FnMut(&EditEvent)>;

/// Queue of edit events plus named listeners called as events are pushed.
/// Delivery is fire-and-forget; nothing a listener does affects the edit.
#[derive(Default)]
pub struct EventBus {
    events: Vec<EditEvent>,
    listeners: HashMap<String, Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` for every event named `name`.
    pub fn on(&mut self, name: impl Into<String>, handler: impl FnMut(&EditEvent) + 'static) {
        self.listeners
            .entry(name.into())
            .or_default()
            .push(Box::new(handler));
    }

    pub fn push(&mut self, event: EditEvent) {
        if let Some(handlers) = self.listeners.get_mut(&event.name) {
            for handler in handlers.iter_mut() {
                handler(&event);
            }
        }
        self.events.push(event);
    }

    pub fn emit(&mut self, name: impl Into<String>, phase: EditPhase, keys: Vec<EntityKey>) {
        self.push(EditEvent {
            name: name.into(),
            phase,
            keys,
        });
    }

    /// Drain all events from the bus, returning them
    pub fn drain(&mut self) -> Vec<EditEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.events)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnet_core::EntityId;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_push_and_drain() {
        let mut bus = EventBus::new();
        assert!(bus.is_empty());

        bus.emit("InvokeRemoveSignalEvent", EditPhase::Commit, Vec::new());
        bus.emit(
            "InvokeRemoveSignalEvent",
            EditPhase::Undo,
            vec![EntityKey::signal(EntityId::from_raw(4))],
        );
        assert_eq!(bus.len(), 2);

        let events = bus.drain();
        assert_eq!(events[1].phase, EditPhase::Undo);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_listeners_only_see_their_event() {
        let seen = Rc::new(Cell::new(0));
        let mut bus = EventBus::new();
        let counter = seen.clone();
        bus.on(INVALID_GEOMETRY_EVENT, move |event| {
            assert_eq!(event.phase, EditPhase::Rejected);
            counter.set(counter.get() + 1);
        });

        bus.emit("InvokeCreateJunctionEvent", EditPhase::Commit, Vec::new());
        bus.emit(INVALID_GEOMETRY_EVENT, EditPhase::Rejected, Vec::new());
        assert_eq!(seen.get(), 1);
        assert_eq!(bus.len(), 2);
    }
}
