//! Export sync - turns dirty keys into serialized entity snapshots
//!
//! The external exporter walks an `ExportBatch` per save cycle. Hashes of
//! what was handed out are staged by `collect` and only become the
//! comparison baseline once `finish_cycle` confirms the save.

use crate::dirty::DirtyTracker;
use crate::entity::EntityKey;
use crate::store::SceneStore;
use indexmap::IndexMap;
use roadnet_core::{ContentHash, Result, RoadError};
use serde::Serialize;
use std::collections::HashMap;

/// One changed entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub key: EntityKey,
    pub hash: ContentHash,
    pub data: serde_json::Value,
}

/// Everything that changed since the last finished cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportBatch {
    pub cycle: u64,
    pub changed: Vec<ExportRecord>,
    pub removed: Vec<EntityKey>,
}

impl ExportBatch {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ExportSync {
    cycle: u64,
    exported: HashMap<EntityKey, ContentHash>,
    staged: IndexMap<EntityKey, Option<ContentHash>>,
}

impl ExportSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain `tracker` and serialize every dirty entity whose content
    /// differs from the last exported version.
    pub fn collect(&mut self, store: &SceneStore, tracker: &mut DirtyTracker) -> Result<ExportBatch> {
        let mut batch = ExportBatch {
            cycle: self.cycle,
            ..ExportBatch::default()
        };

        for key in tracker.drain_dirty() {
            match store.snapshot(key) {
                Some(entity) => {
                    let data = serde_json::to_value(&entity)
                        .map_err(|e| RoadError::Export(format!("{}: {}", key, e)))?;
                    let hash = ContentHash::of_record(&data)?;
                    if self.exported.get(&key) == Some(&hash) {
                        continue;
                    }
                    self.staged.insert(key, Some(hash));
                    batch.changed.push(ExportRecord { key, hash, data });
                }
                None => {
                    if self.exported.contains_key(&key) {
                        self.staged.insert(key, None);
                        batch.removed.push(key);
                    }
                }
            }
        }

        tracing::debug!(
            cycle = self.cycle,
            changed = batch.changed.len(),
            removed = batch.removed.len(),
            "collected export batch"
        );
        Ok(batch)
    }

    /// Confirm the batches collected this cycle were saved. Returns the
    /// number of the cycle that was closed.
    pub fn finish_cycle(&mut self) -> u64 {
        for (key, hash) in self.staged.drain(..) {
            match hash {
                Some(hash) => {
                    self.exported.insert(key, hash);
                }
                None => {
                    self.exported.remove(&key);
                }
            }
        }
        let finished = self.cycle;
        self.cycle += 1;
        finished
    }

    /// Give up on this cycle's batches; their keys become dirty again.
    pub fn abort_cycle(&mut self, tracker: &mut DirtyTracker) {
        tracker.mark_all(self.staged.drain(..).map(|(key, _)| key));
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn last_exported(&self, key: EntityKey) -> Option<ContentHash> {
        self.exported.get(&key).copied()
    }
}
