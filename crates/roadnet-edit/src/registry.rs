//! Edit registry - `(EditKind, EntityCategory)` to behavior dispatch

use crate::context::EditContext;
use crate::payload::{EditKind, EditPayload, Subject};
use crate::transaction::EditTransaction;
use roadnet_core::{Result, RoadError};
use roadnet_scene::{EntityCategory, SceneStore};
use std::collections::HashMap;
use std::fmt;

pub type ValidateFn = fn(&SceneStore, &EditPayload) -> Result<()>;
pub type ApplyFn = fn(&mut EditContext<'_>, &EditPayload) -> Result<()>;

/// The two halves of an edit: a precondition check run before any
/// transaction exists, and the mutation run inside the journal.
#[derive(Clone, Copy)]
pub struct EditBehavior {
    pub validate: ValidateFn,
    pub apply: ApplyFn,
}

impl EditBehavior {
    pub fn new(validate: ValidateFn, apply: ApplyFn) -> Self {
        Self { validate, apply }
    }
}

impl fmt::Debug for EditBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditBehavior").finish_non_exhaustive()
    }
}

/// Dispatch table from edit kind and entity category to behavior.
#[derive(Debug, Default)]
pub struct TransactionMap {
    behaviors: HashMap<(EditKind, EntityCategory), EditBehavior>,
}

impl TransactionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map with every built-in edit registered.
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        crate::edits::register_defaults(&mut map);
        map
    }

    pub fn register(&mut self, kind: EditKind, category: EntityCategory, behavior: EditBehavior) {
        self.behaviors.insert((kind, category), behavior);
    }

    pub fn get(&self, kind: EditKind, category: EntityCategory) -> Option<&EditBehavior> {
        self.behaviors.get(&(kind, category))
    }

    pub fn supports(&self, kind: EditKind, category: EntityCategory) -> bool {
        self.behaviors.contains_key(&(kind, category))
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Resolve, check and wrap `payload` into a transaction.
    ///
    /// Fails with `EntityNotFound` when the edit's subject is gone, and
    /// with a precondition error when the pair is unsupported or the
    /// behavior's check refuses the payload. Nothing is built on failure.
    pub fn build(&self, store: &SceneStore, payload: EditPayload) -> Result<EditTransaction> {
        let kind = payload.kind();
        let category = payload.category(store).ok_or_else(|| match payload.subject() {
            Subject::Existing(key) => RoadError::EntityNotFound(key.to_string()),
            Subject::New(category) => RoadError::EntityNotFound(category.to_string()),
        })?;
        let behavior = *self
            .get(kind, category)
            .ok_or_else(|| RoadError::UnsupportedEdit {
                edit: kind.to_string(),
                category: category.to_string(),
            })?;
        (behavior.validate)(store, &payload)?;
        Ok(EditTransaction::new(kind, category, payload, behavior))
    }
}
