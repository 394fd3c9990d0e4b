//! Composition transactions - ordered batches committed as one unit

use crate::transaction::{check_state, Step, Transaction, TransactionState};
use crate::world::RoadWorld;
use roadnet_core::Result;
use roadnet_scene::EntityKey;

/// Children are fixed at construction. Commit and redo run them first to
/// last; undo runs them last to first, so the primary edit is applied
/// first and reversed last.
#[derive(Debug)]
pub struct CompositionTransaction {
    label: String,
    children: Vec<Box<dyn Transaction>>,
    state: TransactionState,
}

impl CompositionTransaction {
    pub fn new(label: impl Into<String>, children: Vec<Box<dyn Transaction>>) -> Self {
        Self {
            label: label.into(),
            children,
            state: TransactionState::Uncommitted,
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Undo `children[..count]` newest first after a failed commit.
    fn unwind(&mut self, count: usize, world: &mut RoadWorld) {
        for child in self.children[..count].iter_mut().rev() {
            if let Err(err) = child.on_undo(world) {
                tracing::debug!(
                    label = %self.label,
                    child = child.label(),
                    %err,
                    "unwinding skipped a child"
                );
            }
        }
    }
}

impl Transaction for CompositionTransaction {
    fn label(&self) -> &str {
        &self.label
    }

    fn event_name(&self) -> String {
        format!("Invoke{}Event", self.label)
    }

    fn state(&self) -> TransactionState {
        self.state
    }

    fn commit(&mut self, world: &mut RoadWorld) -> Result<Vec<EntityKey>> {
        check_state(&self.label, self.state, Step::Commit)?;
        for i in 0..self.children.len() {
            if let Err(err) = self.children[i].commit(world) {
                self.unwind(i, world);
                return Err(err);
            }
        }
        self.state = TransactionState::Committed;
        Ok(self.touched())
    }

    fn on_undo(&mut self, world: &mut RoadWorld) -> Result<()> {
        check_state(&self.label, self.state, Step::Undo)?;
        for child in self.children.iter_mut().rev() {
            child.on_undo(world)?;
        }
        self.state = TransactionState::Undone;
        Ok(())
    }

    fn on_redo(&mut self, world: &mut RoadWorld) -> Result<()> {
        check_state(&self.label, self.state, Step::Redo)?;
        for child in self.children.iter_mut() {
            child.on_redo(world)?;
        }
        self.state = TransactionState::Redone;
        Ok(())
    }

    fn touched(&self) -> Vec<EntityKey> {
        let mut keys = Vec::new();
        for key in self.children.iter().flat_map(|child| child.touched()) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}
