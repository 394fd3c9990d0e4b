//! Undo/redo stack with bounded depth

use crate::transaction::Transaction;
use std::collections::VecDeque;

/// Default number of undo entries kept before the oldest is evicted.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Undo entries most-recent-last; redo entries most-recent-first, so the
/// transaction undone last is redone first.
#[derive(Debug)]
pub struct TransactionStack {
    undo: Vec<Box<dyn Transaction>>,
    redo: VecDeque<Box<dyn Transaction>>,
    max_depth: usize,
}

impl Default for TransactionStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TransactionStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Push a freshly committed entry, evicting the oldest entries while
    /// the list is over `max_depth`.
    pub fn push_undo(&mut self, tx: Box<dyn Transaction>) {
        self.undo.push(tx);
        while self.undo.len() > self.max_depth {
            let evicted = self.undo.remove(0);
            tracing::trace!(label = evicted.label(), "evicted from undo history");
        }
    }

    pub fn pop_undo(&mut self) -> Option<Box<dyn Transaction>> {
        self.undo.pop()
    }

    pub fn clean_undo(&mut self) {
        self.undo.clear();
    }

    pub fn push_redo(&mut self, tx: Box<dyn Transaction>) {
        self.redo.push_front(tx);
    }

    pub fn pop_redo(&mut self) -> Option<Box<dyn Transaction>> {
        self.redo.pop_front()
    }

    pub fn clean_redo(&mut self) {
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo.last().map(|tx| tx.label())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo.front().map(|tx| tx.label())
    }

    /// Undo labels, oldest first.
    pub fn undo_labels(&self) -> Vec<&str> {
        self.undo.iter().map(|tx| tx.label()).collect()
    }

    /// Redo labels, next-to-redo first.
    pub fn redo_labels(&self) -> Vec<&str> {
        self.redo.iter().map(|tx| tx.label()).collect()
    }

    /// Move every entry of `other` onto the end of this stack, keeping
    /// relative order in both lists.
    ///
    /// Nothing is evicted here: a merge may leave the list above
    /// `max_depth` until the next `push_undo`.
    pub fn append(&mut self, mut other: TransactionStack) {
        self.undo.append(&mut other.undo);
        self.redo.append(&mut other.redo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionState;
    use crate::world::RoadWorld;
    use roadnet_core::Result;
    use roadnet_scene::EntityKey;

    #[derive(Debug)]
    struct Named(String);

    impl Transaction for Named {
        fn label(&self) -> &str {
            &self.0
        }
        fn event_name(&self) -> String {
            self.0.clone()
        }
        fn state(&self) -> TransactionState {
            TransactionState::Committed
        }
        fn commit(&mut self, _: &mut RoadWorld) -> Result<Vec<EntityKey>> {
            Ok(Vec::new())
        }
        fn on_undo(&mut self, _: &mut RoadWorld) -> Result<()> {
            Ok(())
        }
        fn on_redo(&mut self, _: &mut RoadWorld) -> Result<()> {
            Ok(())
        }
        fn touched(&self) -> Vec<EntityKey> {
            Vec::new()
        }
    }

    fn named(label: &str) -> Box<dyn Transaction> {
        Box::new(Named(label.to_string()))
    }

    #[test]
    fn test_undo_is_lifo() {
        let mut stack = TransactionStack::default();
        stack.push_undo(named("a"));
        stack.push_undo(named("b"));
        assert_eq!(stack.undo_description(), Some("b"));
        assert_eq!(stack.pop_undo().unwrap().label(), "b");
        assert_eq!(stack.pop_undo().unwrap().label(), "a");
        assert!(stack.pop_undo().is_none());
    }

    #[test]
    fn test_redo_pushes_and_pops_at_the_front() {
        let mut stack = TransactionStack::default();
        stack.push_redo(named("first undone"));
        stack.push_redo(named("second undone"));
        assert_eq!(stack.redo_labels(), vec!["second undone", "first undone"]);
        assert_eq!(stack.redo_description(), Some("second undone"));
        assert_eq!(stack.pop_redo().unwrap().label(), "second undone");
        stack.clean_redo();
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_max_depth_evicts_oldest() {
        let mut stack = TransactionStack::new(2);
        stack.push_undo(named("a"));
        stack.push_undo(named("b"));
        stack.push_undo(named("c"));
        assert_eq!(stack.undo_labels(), vec!["b", "c"]);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut base = TransactionStack::default();
        base.push_undo(named("a"));
        let mut other = TransactionStack::default();
        other.push_undo(named("b"));
        other.push_undo(named("c"));
        other.push_redo(named("d"));

        base.append(other);
        assert_eq!(base.undo_labels(), vec!["a", "b", "c"]);
        assert_eq!(base.redo_labels(), vec!["d"]);
    }

    #[test]
    fn test_append_into_full_stack_keeps_everything() {
        let mut base = TransactionStack::new(3);
        for label in ["a", "b", "c"] {
            base.push_undo(named(label));
        }
        let mut merged = TransactionStack::new(3);
        merged.push_undo(named("d"));
        merged.push_undo(named("e"));

        base.append(merged);
        assert_eq!(base.undo_labels(), vec!["a", "b", "c", "d", "e"]);

        base.push_undo(named("f"));
        assert_eq!(base.undo_labels(), vec!["d", "e", "f"]);
    }

    quickcheck::quickcheck! {
        fn undo_depth_never_exceeds_the_limit(pushes: u8, depth: u8) -> bool {
            let depth = usize::from(depth % 16) + 1;
            let mut stack = TransactionStack::new(depth);
            for i in 0..pushes {
                stack.push_undo(named(&i.to_string()));
            }
            let expected_top = pushes.checked_sub(1).map(|top| top.to_string());
            stack.undo_len() == usize::from(pushes).min(depth)
                && stack.undo_description() == expected_top.as_deref()
        }
    }
}
