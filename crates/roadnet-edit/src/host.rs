use crate::transaction::Transaction;
use roadnet_core::Result;
use roadnet_scene::EntityKey;

/// History operations a UI drives. Implemented by `Editor`.
pub trait TransactionHost {
    /// Commit a built transaction onto the active history.
    fn commit(&mut self, tx: Box<dyn Transaction>) -> Result<Vec<EntityKey>>;

    /// Undo the newest entry. `false` when there was nothing to undo.
    fn undo(&mut self) -> Result<bool>;

    /// Redo the next entry. `false` when there was nothing to redo.
    fn redo(&mut self) -> Result<bool>;

    fn enter_transaction_sub_env(&mut self);

    fn exit_transaction_sub_env_in_copy(&mut self) -> Result<()>;

    fn exit_transaction_sub_env_in_discard(&mut self) -> Result<()>;
}
