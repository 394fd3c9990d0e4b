//! Transaction manager - active stack selection and sub-environments

use crate::stack::TransactionStack;
use crate::transaction::Transaction;
use crate::world::RoadWorld;
use roadnet_core::{Result, RoadError};
use roadnet_scene::EntityKey;

/// Owns the default history and a stack of nested sub-environments.
/// The innermost sub-environment, if any, is the active stack.
#[derive(Debug)]
pub struct TransactionManager {
    default: TransactionStack,
    sub_envs: Vec<TransactionStack>,
    max_depth: usize,
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new(crate::stack::DEFAULT_MAX_DEPTH)
    }
}

impl TransactionManager {
    pub fn new(max_depth: usize) -> Self {
        Self {
            default: TransactionStack::new(max_depth),
            sub_envs: Vec::new(),
            max_depth,
        }
    }

    pub fn active(&self) -> &TransactionStack {
        self.sub_envs.last().unwrap_or(&self.default)
    }

    fn active_mut(&mut self) -> &mut TransactionStack {
        self.sub_envs.last_mut().unwrap_or(&mut self.default)
    }

    pub fn default_stack(&self) -> &TransactionStack {
        &self.default
    }

    /// Number of nested sub-environments, 0 when the default stack is active.
    pub fn depth(&self) -> usize {
        self.sub_envs.len()
    }

    /// Commit `tx` and push it onto the active stack, clearing its redo
    /// list. A failed commit leaves the history untouched.
    pub fn commit(
        &mut self,
        mut tx: Box<dyn Transaction>,
        world: &mut RoadWorld,
    ) -> Result<Vec<EntityKey>> {
        let keys = tx.commit(world)?;
        tracing::debug!(label = tx.label(), entities = keys.len(), "committed");
        let active = self.active_mut();
        active.clean_redo();
        active.push_undo(tx);
        Ok(keys)
    }

    /// Undo the newest entry of the active stack. `Ok(None)` when there is
    /// nothing to undo.
    pub fn undo(&mut self, world: &mut RoadWorld) -> Result<Option<HistoryStep>> {
        let active = self.active_mut();
        let Some(mut tx) = active.pop_undo() else {
            return Ok(None);
        };
        if let Err(err) = tx.on_undo(world) {
            active.push_undo(tx);
            return Err(err);
        }
        tracing::debug!(label = tx.label(), "undone");
        let step = HistoryStep::of(tx.as_ref());
        active.push_redo(tx);
        Ok(Some(step))
    }

    /// Redo the next entry of the active stack. `Ok(None)` when there is
    /// nothing to redo.
    pub fn redo(&mut self, world: &mut RoadWorld) -> Result<Option<HistoryStep>> {
        let active = self.active_mut();
        let Some(mut tx) = active.pop_redo() else {
            return Ok(None);
        };
        if let Err(err) = tx.on_redo(world) {
            active.push_redo(tx);
            return Err(err);
        }
        tracing::debug!(label = tx.label(), "redone");
        let step = HistoryStep::of(tx.as_ref());
        active.push_undo(tx);
        Ok(Some(step))
    }

    pub fn can_undo(&self) -> bool {
        self.active().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.active().can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.active().undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.active().redo_description()
    }

    /// Start a scratch history. Edits committed from now on go to a
    /// fresh stack until the sub-environment is merged or discarded.
    pub fn enter_transaction_sub_env(&mut self) {
        self.sub_envs.push(TransactionStack::new(self.max_depth));
        tracing::debug!(depth = self.sub_envs.len(), "entered transaction sub-env");
    }

    /// Merge the innermost sub-environment into its parent: the parent's
    /// redo list is cleared, then the sub-environment's undo and redo
    /// entries are appended in order.
    pub fn exit_transaction_sub_env_in_copy(&mut self) -> Result<()> {
        let sub = self.pop_sub_env()?;
        let merged = sub.undo_len();
        let parent = self.active_mut();
        parent.clean_redo();
        parent.append(sub);
        tracing::debug!(merged, "merged transaction sub-env");
        Ok(())
    }

    /// Drop the innermost sub-environment, undoing its entries newest
    /// first so the world returns to the state it had on entry. Returns
    /// the keys the undone entries touched.
    pub fn exit_transaction_sub_env_in_discard(
        &mut self,
        world: &mut RoadWorld,
    ) -> Result<Vec<EntityKey>> {
        let mut sub = self.pop_sub_env()?;
        let mut touched = Vec::new();
        let mut discarded = 0;
        while let Some(mut tx) = sub.pop_undo() {
            tx.on_undo(world)?;
            for key in tx.touched() {
                if !touched.contains(&key) {
                    touched.push(key);
                }
            }
            discarded += 1;
        }
        tracing::debug!(discarded, "discarded transaction sub-env");
        Ok(touched)
    }

    fn pop_sub_env(&mut self) -> Result<TransactionStack> {
        self.sub_envs
            .pop()
            .ok_or_else(|| RoadError::InvalidState("no transaction sub-env to exit".into()))
    }
}

/// What an undo or redo step ran, for notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStep {
    pub label: String,
    pub event_name: String,
    pub keys: Vec<EntityKey>,
}

impl HistoryStep {
    fn of(tx: &dyn Transaction) -> Self {
        Self {
            label: tx.label().to_string(),
            event_name: tx.event_name(),
            keys: tx.touched(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::DEFAULT_MAX_DEPTH;
    use crate::transaction::TransactionState;
    use roadnet_core::EntityId;
    use roadnet_scene::Junction;

    /// Adds an empty junction on commit and redo, removes it on undo.
    #[derive(Debug)]
    struct AddJunction {
        label: String,
        id: EntityId,
        state: TransactionState,
    }

    fn add(id: u64) -> Box<dyn Transaction> {
        Box::new(AddJunction {
            label: format!("add {}", id),
            id: EntityId::from_raw(id),
            state: TransactionState::Uncommitted,
        })
    }

    impl AddJunction {
        fn insert(&self, world: &mut RoadWorld) -> Result<()> {
            world.store.insert_junction(Junction {
                id: self.id,
                members: Vec::new(),
                connections: Vec::new(),
            })
        }
    }

    impl Transaction for AddJunction {
        fn label(&self) -> &str {
            &self.label
        }
        fn event_name(&self) -> String {
            "InvokeCreateJunctionEvent".into()
        }
        fn state(&self) -> TransactionState {
            self.state
        }
        fn commit(&mut self, world: &mut RoadWorld) -> Result<Vec<EntityKey>> {
            self.insert(world)?;
            self.state = TransactionState::Committed;
            Ok(self.touched())
        }
        fn on_undo(&mut self, world: &mut RoadWorld) -> Result<()> {
            world.store.remove_junction(self.id);
            self.state = TransactionState::Undone;
            Ok(())
        }
        fn on_redo(&mut self, world: &mut RoadWorld) -> Result<()> {
            self.insert(world)?;
            self.state = TransactionState::Redone;
            Ok(())
        }
        fn touched(&self) -> Vec<EntityKey> {
            vec![EntityKey::junction(self.id)]
        }
    }

    fn has(world: &RoadWorld, id: u64) -> bool {
        world.store.junction(EntityId::from_raw(id)).is_some()
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        manager.commit(add(9001), &mut world).unwrap();

        let step = manager.undo(&mut world).unwrap().unwrap();
        assert_eq!(step.label, "add 9001");
        assert!(!has(&world, 9001));
        assert_eq!(manager.redo_description(), Some("add 9001"));

        manager.redo(&mut world).unwrap().unwrap();
        assert!(has(&world, 9001));
        assert!(manager.can_undo());
        assert!(!manager.can_redo());
    }

    #[test]
    fn test_empty_history_is_a_no_op() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        assert!(manager.undo(&mut world).unwrap().is_none());
        assert!(manager.redo(&mut world).unwrap().is_none());
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        manager.commit(add(9011), &mut world).unwrap();
        manager.undo(&mut world).unwrap();
        assert!(manager.can_redo());

        manager.commit(add(9012), &mut world).unwrap();
        assert!(!manager.can_redo());
    }

    #[test]
    fn test_failed_commit_keeps_history() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        manager.commit(add(9021), &mut world).unwrap();
        manager.undo(&mut world).unwrap();
        world.store.insert_junction(Junction {
            id: EntityId::from_raw(9022),
            members: Vec::new(),
            connections: Vec::new(),
        })
        .unwrap();

        assert!(manager.commit(add(9022), &mut world).is_err());
        assert!(manager.can_redo());
        assert_eq!(manager.active().undo_len(), 0);
    }

    #[test]
    fn test_sub_env_merge_appends_in_order() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        manager.commit(add(9031), &mut world).unwrap();
        manager.commit(add(9032), &mut world).unwrap();
        manager.undo(&mut world).unwrap();

        manager.enter_transaction_sub_env();
        assert_eq!(manager.depth(), 1);
        assert!(!manager.can_undo());
        manager.commit(add(9033), &mut world).unwrap();
        manager.commit(add(9034), &mut world).unwrap();
        manager.exit_transaction_sub_env_in_copy().unwrap();

        let stack = manager.default_stack();
        assert_eq!(stack.undo_labels(), vec!["add 9031", "add 9033", "add 9034"]);
        assert_eq!(stack.redo_len(), 0);
        assert_eq!(manager.depth(), 0);
    }

    #[test]
    fn test_merge_into_full_default_stack_grows_by_the_merged_entries() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        for id in 0..DEFAULT_MAX_DEPTH as u64 {
            manager.commit(add(20_000 + id), &mut world).unwrap();
        }
        let before = manager.default_stack().undo_len();
        assert_eq!(before, DEFAULT_MAX_DEPTH);

        manager.enter_transaction_sub_env();
        manager.commit(add(21_001), &mut world).unwrap();
        manager.commit(add(21_002), &mut world).unwrap();
        manager.exit_transaction_sub_env_in_copy().unwrap();

        let stack = manager.default_stack();
        assert_eq!(stack.undo_len(), before + 2);
        assert_eq!(stack.undo_labels()[0], "add 20000");
        assert_eq!(stack.undo_description(), Some("add 21002"));
    }

    #[test]
    fn test_sub_env_discard_undoes_its_entries() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        manager.commit(add(9041), &mut world).unwrap();

        manager.enter_transaction_sub_env();
        manager.commit(add(9042), &mut world).unwrap();
        manager.commit(add(9043), &mut world).unwrap();
        let touched = manager.exit_transaction_sub_env_in_discard(&mut world).unwrap();

        assert_eq!(touched.len(), 2);
        assert!(has(&world, 9041));
        assert!(!has(&world, 9042) && !has(&world, 9043));
        assert_eq!(manager.default_stack().undo_labels(), vec!["add 9041"]);
    }

    #[test]
    fn test_nested_sub_env_merges_into_parent() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        manager.enter_transaction_sub_env();
        manager.commit(add(9051), &mut world).unwrap();
        manager.enter_transaction_sub_env();
        manager.commit(add(9052), &mut world).unwrap();

        manager.exit_transaction_sub_env_in_copy().unwrap();
        assert_eq!(manager.depth(), 1);
        assert_eq!(manager.active().undo_labels(), vec!["add 9051", "add 9052"]);
        assert_eq!(manager.default_stack().undo_len(), 0);
    }

    #[test]
    fn test_exit_without_sub_env_fails() {
        let mut world = RoadWorld::default();
        let mut manager = TransactionManager::default();
        assert!(manager.exit_transaction_sub_env_in_copy().is_err());
        assert!(manager.exit_transaction_sub_env_in_discard(&mut world).is_err());
    }
}
