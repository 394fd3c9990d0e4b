//! Transactions - the atomic unit of change

use crate::context::{restore_all, EditContext, Journal, Snapshots};
use crate::payload::{EditKind, EditPayload};
use crate::registry::EditBehavior;
use crate::world::RoadWorld;
use roadnet_core::{Result, RoadError};
use roadnet_scene::{EntityCategory, EntityKey};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Uncommitted,
    Committed,
    Undone,
    Redone,
}

impl TransactionState {
    pub fn can_undo(self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::Redone)
    }

    pub fn can_redo(self) -> bool {
        self == TransactionState::Undone
    }
}

/// Something that can be committed once, then undone and redone any
/// number of times. `commit`, `on_undo` and `on_redo` run to completion.
pub trait Transaction: fmt::Debug {
    /// Human readable label, shown as the undo/redo description.
    fn label(&self) -> &str;

    /// Name of the notification emitted when this transaction runs.
    fn event_name(&self) -> String;

    fn state(&self) -> TransactionState;

    /// Apply the edit. Returns the keys of every entity it touched.
    fn commit(&mut self, world: &mut RoadWorld) -> Result<Vec<EntityKey>>;

    fn on_undo(&mut self, world: &mut RoadWorld) -> Result<()>;

    fn on_redo(&mut self, world: &mut RoadWorld) -> Result<()>;

    /// Keys touched by the last commit, empty before it.
    fn touched(&self) -> Vec<EntityKey>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Commit,
    Undo,
    Redo,
}

/// Reject a lifecycle step the current state does not allow.
pub(crate) fn check_state(label: &str, state: TransactionState, step: Step) -> Result<()> {
    let allowed = match step {
        Step::Commit => state == TransactionState::Uncommitted,
        Step::Undo => state.can_undo(),
        Step::Redo => state.can_redo(),
    };
    if allowed {
        Ok(())
    } else {
        Err(RoadError::InvalidState(format!(
            "cannot {:?} '{}' in state {:?}",
            step, label, state
        )))
    }
}

/// One data-driven edit: a payload plus the behavior registered for its
/// `(EditKind, EntityCategory)` pair.
///
/// Commit runs the behavior through a journal. Before-snapshots come from
/// the journal and after-snapshots are read once the behavior returns, so
/// undo and redo are plain restores and redo reproduces the committed
/// state exactly.
#[derive(Debug)]
pub struct EditTransaction {
    label: String,
    kind: EditKind,
    category: EntityCategory,
    payload: EditPayload,
    behavior: EditBehavior,
    state: TransactionState,
    before: Snapshots,
    after: Snapshots,
}

impl EditTransaction {
    pub fn new(
        kind: EditKind,
        category: EntityCategory,
        payload: EditPayload,
        behavior: EditBehavior,
    ) -> Self {
        Self {
            label: format!("{}{}", kind, category),
            kind,
            category,
            payload,
            behavior,
            state: TransactionState::Uncommitted,
            before: Snapshots::new(),
            after: Snapshots::new(),
        }
    }

    pub fn kind(&self) -> EditKind {
        self.kind
    }

    pub fn category(&self) -> EntityCategory {
        self.category
    }

    pub fn payload(&self) -> &EditPayload {
        &self.payload
    }
}

impl Transaction for EditTransaction {
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

        let mut journal = Journal::new();
        let applied = {
            let mut ctx = EditContext::new(&mut world.store, &world.engine, &mut journal);
            (self.behavior.apply)(&mut ctx, &self.payload)
        };
        if let Err(err) = applied {
            journal.rollback(&mut world.store);
            return Err(err);
        }

        self.after = journal.capture(&world.store);
        self.before = journal.into_snapshots();
        self.state = TransactionState::Committed;
        Ok(self.touched())
    }

    fn on_undo(&mut self, world: &mut RoadWorld) -> Result<()> {
        check_state(&self.label, self.state, Step::Undo)?;
        restore_all(&mut world.store, &self.before);
        self.state = TransactionState::Undone;
        Ok(())
    }

    fn on_redo(&mut self, world: &mut RoadWorld) -> Result<()> {
        check_state(&self.label, self.state, Step::Redo)?;
        restore_all(&mut world.store, &self.after);
        self.state = TransactionState::Redone;
        Ok(())
    }

    fn touched(&self) -> Vec<EntityKey> {
        self.before.keys().copied().collect()
    }
}
