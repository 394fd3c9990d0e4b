//! Roadnet Edit - Transactions and history for the roadnet editor
//!
//! Every edit is a transaction with atomic commit, exact undo and exact
//! redo:
//! - `EditTransaction` - one data-driven edit dispatched through the
//!   `(EditKind, EntityCategory)` registry
//! - `CompositionTransaction` - ordered batches, reversed as a unit
//! - `TransactionStack` / `TransactionManager` - linear undo/redo history
//!   with scratch sub-environments
//! - `Editor` - the host that applies the error policy, emits events and
//!   keeps markers and export state in sync

mod composition;
mod config;
mod context;
pub mod edits;
mod editor;
mod events;
mod host;
mod manager;
mod markers;
mod payload;
mod registry;
mod scheduler;
mod stack;
mod transaction;
mod world;

pub use composition::CompositionTransaction;
pub use config::{EditorConfig, HistoryConfig, SchedulerConfig};
pub use context::{EditContext, Journal, Snapshots};
pub use editor::Editor;
pub use events::{EditEvent, EditPhase, EventBus, INVALID_GEOMETRY_EVENT};
pub use host::TransactionHost;
pub use manager::{HistoryStep, TransactionManager};
pub use markers::{MarkerHandle, MarkerHost, NullMarkers};
pub use payload::{EditKind, EditPayload, Subject};
pub use registry::{ApplyFn, EditBehavior, TransactionMap, ValidateFn};
pub use scheduler::{Budget, RunOutcome, WorkQueue};
pub use stack::{TransactionStack, DEFAULT_MAX_DEPTH};
pub use transaction::{EditTransaction, Transaction, TransactionState};
pub use world::RoadWorld;
