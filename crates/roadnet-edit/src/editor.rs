//! Editor - the concrete transaction host
//!
//! Ties the world, the history and the registry together and applies the
//! error policy: invalid geometry is rolled back and announced, a stale id
//! aborts silently, and a failed precondition never creates a transaction.

use crate::config::EditorConfig;
use crate::edits::altitude_edit;
use crate::events::{EditPhase, EventBus, INVALID_GEOMETRY_EVENT};
use crate::host::TransactionHost;
use crate::manager::{HistoryStep, TransactionManager};
use crate::markers::{MarkerHandle, MarkerHost, NullMarkers};
use crate::payload::EditPayload;
use crate::registry::TransactionMap;
use crate::scheduler::{Budget, RunOutcome, WorkQueue};
use crate::transaction::Transaction;
use crate::world::RoadWorld;
use indexmap::IndexMap;
use roadnet_core::{EntityId, Result};
use roadnet_scene::{DirtyTracker, EntityKey, EntityKind, ExportBatch, ExportSync, SceneStore};

pub struct Editor {
    config: EditorConfig,
    world: RoadWorld,
    history: TransactionManager,
    registry: TransactionMap,
    events: EventBus,
    dirty: DirtyTracker,
    export: ExportSync,
    markers: Box<dyn MarkerHost>,
    marker_handles: IndexMap<EntityId, Vec<MarkerHandle>>,
    refresh: WorkQueue<EntityId>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let engine = config.engine()?;
        Ok(Self {
            history: TransactionManager::new(config.history.max_depth),
            world: RoadWorld::new(engine),
            registry: TransactionMap::with_defaults(),
            events: EventBus::new(),
            dirty: DirtyTracker::new(),
            export: ExportSync::new(),
            markers: Box::new(NullMarkers::default()),
            marker_handles: IndexMap::new(),
            refresh: WorkQueue::new(),
            config,
        })
    }

    pub fn with_markers(mut self, markers: impl MarkerHost + 'static) -> Self {
        self.markers = Box::new(markers);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &SceneStore {
        &self.world.store
    }

    pub fn history(&self) -> &TransactionManager {
        &self.history
    }

    pub fn registry(&self) -> &TransactionMap {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TransactionMap {
        &mut self.registry
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    /// Build a transaction for `payload` and commit it.
    ///
    /// Returns the touched keys; an empty list means the edit's subject
    /// was already gone and nothing happened.
    pub fn edit(&mut self, payload: EditPayload) -> Result<Vec<EntityKey>> {
        match self.registry.build(&self.world.store, payload) {
            Ok(tx) => self.commit(Box::new(tx)),
            Err(err) if err.is_lookup_failure() => {
                tracing::debug!(%err, "edit aborted on a stale id");
                Ok(Vec::new())
            }
            Err(err) => {
                tracing::debug!(%err, "edit refused before commit");
                Err(err)
            }
        }
    }

    /// Move control point `index` of `road` to `altitude`, carrying the
    /// change into attached roads and the road's junction as one entry.
    pub fn altitude_edit(&mut self, road: EntityId, index: usize, altitude: f64) -> Result<Vec<EntityKey>> {
        match altitude_edit(&self.registry, &self.world.store, road, index, altitude) {
            Ok(tx) => self.commit(Box::new(tx)),
            Err(err) if err.is_lookup_failure() => {
                tracing::debug!(%road, %err, "altitude edit aborted on a stale id");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    /// Serialize everything touched since the last export.
    pub fn collect_export(&mut self) -> Result<ExportBatch> {
        self.export.collect(&self.world.store, &mut self.dirty)
    }

    pub fn finish_export_cycle(&mut self) -> u64 {
        self.export.finish_cycle()
    }

    pub fn abort_export_cycle(&mut self) {
        self.export.abort_cycle(&mut self.dirty);
    }

    /// Queue marker refreshes for `roads`; they run from `pump`.
    pub fn schedule_marker_refresh(&mut self, roads: impl IntoIterator<Item = EntityId>) {
        for road in roads {
            self.refresh.push_unique(road);
        }
    }

    pub fn pending_marker_refreshes(&self) -> usize {
        self.refresh.len()
    }

    /// Run queued marker refreshes within `budget`. Defaults to the
    /// configured batch size when `budget` is `None`.
    pub fn pump(&mut self, budget: Option<Budget>) -> RunOutcome {
        let budget = budget.unwrap_or_else(|| Budget::items(self.config.scheduler.batch_size));
        let Self {
            refresh,
            world,
            markers,
            marker_handles,
            ..
        } = self;
        refresh.run_until_budget(budget, |road| {
            refresh_road_markers(markers.as_mut(), marker_handles, &world.store, road)
        })
    }

    pub fn marker_count(&self, road: EntityId) -> usize {
        self.marker_handles.get(&road).map_or(0, Vec::len)
    }

    fn after_change(&mut self, name: String, phase: EditPhase, keys: Vec<EntityKey>) {
        self.dirty.mark_all(keys.iter().copied());
        let roads: Vec<EntityId> = keys
            .iter()
            .filter(|key| key.kind == EntityKind::Road)
            .map(|key| key.id)
            .collect();
        for road in roads {
            refresh_road_markers(
                self.markers.as_mut(),
                &mut self.marker_handles,
                &self.world.store,
                road,
            );
        }
        self.events.emit(name, phase, keys);
    }

    fn after_history_step(&mut self, step: Option<HistoryStep>, phase: EditPhase) -> bool {
        match step {
            Some(step) => {
                self.after_change(step.event_name, phase, step.keys);
                true
            }
            None => false,
        }
    }
}

/// Replace the markers of `road` with one per control point, or drop them
/// if the road no longer exists.
fn refresh_road_markers(
    markers: &mut dyn MarkerHost,
    handles: &mut IndexMap<EntityId, Vec<MarkerHandle>>,
    store: &SceneStore,
    road: EntityId,
) {
    markers.dispose_markers(&[EntityKey::road(road)]);
    handles.shift_remove(&road);
    if let Some(road) = store.road(road) {
        let created = road
            .reference
            .catmull
            .iter()
            .map(|point| markers.create_marker(*point))
            .collect();
        handles.insert(road.id, created);
    }
}

impl TransactionHost for Editor {
    fn commit(&mut self, tx: Box<dyn Transaction>) -> Result<Vec<EntityKey>> {
        let label = tx.label().to_string();
        let name = tx.event_name();
        match self.history.commit(tx, &mut self.world) {
            Ok(keys) => {
                self.after_change(name, EditPhase::Commit, keys.clone());
                Ok(keys)
            }
            Err(err) if err.is_geometry_invalid() => {
                tracing::warn!(%label, %err, "edit rejected");
                self.events
                    .emit(INVALID_GEOMETRY_EVENT, EditPhase::Rejected, Vec::new());
                Err(err)
            }
            Err(err) if err.is_lookup_failure() => {
                tracing::debug!(%label, %err, "edit aborted on a stale id");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    fn undo(&mut self) -> Result<bool> {
        let step = self.history.undo(&mut self.world)?;
        Ok(self.after_history_step(step, EditPhase::Undo))
    }

    fn redo(&mut self) -> Result<bool> {
        let step = self.history.redo(&mut self.world)?;
        Ok(self.after_history_step(step, EditPhase::Redo))
    }

    fn enter_transaction_sub_env(&mut self) {
        self.history.enter_transaction_sub_env();
    }

    fn exit_transaction_sub_env_in_copy(&mut self) -> Result<()> {
        self.history.exit_transaction_sub_env_in_copy()
    }

    fn exit_transaction_sub_env_in_discard(&mut self) -> Result<()> {
        let touched = self.history.exit_transaction_sub_env_in_discard(&mut self.world)?;
        self.after_change("InvokeDiscardSubEnvEvent".to_string(), EditPhase::Undo, touched);
        Ok(())
    }
}
