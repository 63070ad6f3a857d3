//! The key-value store façade.
//!
//! # Locking
//!
//! All state sits behind one `RwLock`. Mutations hold the write lock for
//! the in-memory change *and* the flush that follows it, so mutations are
//! totally ordered and each one is on disk (or recorded as failed) before
//! the next starts. Reads share the read lock.
//!
//! # Failure Handling
//!
//! A failed flush keeps the in-memory change, marks the store dirty and
//! returns the error. The next mutation, [`Store::flush`] or
//! [`Store::close`] rewrites both documents in full.

use std::fs;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::broadcast;

use super::index::PartitionIndex;
use super::stats::{StoreHealth, StoreStats};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::feed::{ChangeFeed, StoreEvent};
use crate::persistence::{self, item_key, key_group, DocumentPaths, ItemTable, Snapshot};

#[derive(Debug, Default)]
struct StoreState {
    items: ItemTable,
    index: PartitionIndex,
    dirty: bool,
    closed: bool,
    last_error: Option<String>,
}

impl StoreState {
    /// Remove one item and its index entries.
    ///
    /// With a partition field the stored item's own value picks the bucket
    /// first. Every other bucket of the group is then scanned too, since an
    /// earlier `set` under no field or another field can leave the id
    /// behind. Returns whether the item existed.
    fn delete_item(&mut self, group: &str, id: &str, partition_field: Option<&str>) -> bool {
        let Some(item) = self.items.remove(&item_key(group, id)) else {
            let strays = self.index.remove_everywhere(group, id);
            if strays > 0 {
                log::warn!(
                    "Pruned {} index entries for missing item {}:{}",
                    strays,
                    group,
                    id
                );
            }
            return false;
        };

        if let Some(key) = partition_field.and_then(|field| partition_value(&item, field)) {
            self.index.remove(group, &key, id);
        }
        let strays = self.index.remove_everywhere(group, id);
        if strays > 0 {
            log::debug!(
                "Pruned {} stale index entries for {}:{}",
                strays,
                group,
                id
            );
        }
        true
    }
}

/// Embedded JSON key-value store with a partition index.
///
/// Construct with [`Store::open`] and share behind an `Arc`.
pub struct Store {
    config: StoreConfig,
    paths: DocumentPaths,
    state: RwLock<StoreState>,
    feed: ChangeFeed,
}

impl Store {
    /// Open the store, loading both documents from the configured
    /// directory.
    ///
    /// Missing or malformed documents start empty. Index entries pointing
    /// at missing items are pruned; the pruned index is written on the next
    /// flush. Fails if both documents resolve to the same file.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let paths = config.document_paths();
        if paths.items == paths.groups {
            return Err(StoreError::SharedDocumentPath(paths.items));
        }

        fs::create_dir_all(config.data_dir()).map_err(|e| StoreError::io(config.data_dir(), e))?;

        let Snapshot { items, mut index } = persistence::load_snapshot(&paths);

        let pruned = index.retain(|group, _, id| items.contains_key(&item_key(group, id)));
        if pruned > 0 {
            log::warn!(
                "Pruned {} dangling entries from {}",
                pruned,
                paths.groups.display()
            );
        }

        log::info!(
            "Opened store at {} ({} items)",
            config.data_dir().display(),
            items.len()
        );

        Ok(Self {
            config,
            paths,
            state: RwLock::new(StoreState {
                items,
                index,
                dirty: pruned > 0,
                ..StoreState::default()
            }),
            feed: ChangeFeed::new(),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Look up an item. Never fails; a missing item is `None`.
    pub fn get(&self, group: &str, id: &str) -> Option<Value> {
        self.read_state().items.get(&item_key(group, id)).cloned()
    }

    /// Items of the `(group, key)` bucket in insertion order.
    ///
    /// Ids whose item is missing are skipped.
    pub fn get_by_partition(&self, group: &str, key: &str) -> Vec<Value> {
        let state = self.read_state();
        state
            .index
            .ids(group, key)
            .iter()
            .filter_map(|id| state.items.get(&item_key(group, id)).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usage snapshot: on-disk size of both documents and live items per
    /// group.
    pub fn stats(&self) -> StoreStats {
        let state = self.read_state();

        let mut records = std::collections::BTreeMap::new();
        for key in state.items.keys() {
            *records.entry(key_group(key).to_string()).or_insert(0) += 1;
        }

        StoreStats {
            db_size: persistence::snapshot_size(&self.paths),
            records,
            updated: Utc::now(),
        }
    }

    pub fn health(&self) -> StoreHealth {
        let state = self.read_state();
        StoreHealth {
            dirty: state.dirty,
            closed: state.closed,
            last_error: state.last_error.clone(),
        }
    }

    /// Subscribe to mutations made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.feed.subscribe()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert or replace an item.
    ///
    /// With a partition field, the payload's value for it places the id in
    /// that bucket (once); an item whose value changed leaves its old
    /// bucket.
    pub fn set(
        &self,
        group: &str,
        id: &str,
        payload: Value,
        partition_field: Option<&str>,
    ) -> Result<()> {
        let mut state = self.writable()?;
        let key = item_key(group, id);

        if let Some(field) = partition_field {
            let previous = state
                .items
                .get(&key)
                .and_then(|item| partition_value(item, field));
            let next = partition_value(&payload, field);

            if let Some(previous) = previous.filter(|prev| Some(prev) != next.as_ref()) {
                state.index.remove(group, &previous, id);
            }
            match next {
                Some(next) => {
                    state.index.insert(group, &next, id);
                }
                None => log::debug!("{} has no usable {} field, not indexed", key, field),
            }
        }

        state.items.insert(key, payload);
        self.commit(&mut state, Some(StoreEvent::set(group, id)))
    }

    /// Delete an item, returning whether it existed.
    ///
    /// Deleting a missing item is not an error; the documents are still
    /// flushed.
    pub fn delete(&self, group: &str, id: &str, partition_field: Option<&str>) -> Result<bool> {
        let mut state = self.writable()?;
        let existed = state.delete_item(group, id, partition_field);
        let event = existed.then(|| StoreEvent::delete(group, id));
        self.commit(&mut state, event)?;
        Ok(existed)
    }

    /// Delete every item in the `(group, key)` bucket, then the bucket.
    ///
    /// Runs under a single write lock and returns after the flush, so no
    /// other mutation can interleave. Ids whose item is already gone are
    /// skipped. Returns the number of items deleted.
    pub fn delete_by_partition(&self, group: &str, key: &str) -> Result<usize> {
        let mut state = self.writable()?;

        let ids = state.index.remove_bucket(group, key).unwrap_or_default();
        let deleted = ids
            .iter()
            .filter(|id| state.delete_item(group, id, None))
            .count();

        log::debug!(
            "Deleted {} of {} items in {}/{}",
            deleted,
            ids.len(),
            group,
            key
        );

        self.commit(&mut state, Some(StoreEvent::delete_partition(group, key)))?;
        Ok(deleted)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Rewrite both documents from memory.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.writable()?;
        self.flush_locked(&mut state)
    }

    /// Flush pending changes and stop accepting mutations.
    ///
    /// Reads keep working. If the final flush fails the store stays open so
    /// the caller can retry.
    pub fn close(&self) -> Result<()> {
        let mut state = self.write_state();
        if state.closed {
            return Ok(());
        }
        if state.dirty {
            self.flush_locked(&mut state)?;
        }
        state.closed = true;
        log::info!("Closed store at {}", self.config.data_dir().display());
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn writable(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        let state = self.write_state();
        if state.closed {
            return Err(StoreError::Closed);
        }
        Ok(state)
    }

    /// Flush a mutation and announce it once it is on disk.
    fn commit(&self, state: &mut StoreState, event: Option<StoreEvent>) -> Result<()> {
        state.dirty = true;
        self.flush_locked(state)?;
        if let Some(event) = event {
            self.feed.publish(event);
        }
        Ok(())
    }

    fn flush_locked(&self, state: &mut StoreState) -> Result<()> {
        match persistence::save_snapshot(
            &self.paths,
            &state.items,
            &state.index,
            self.config.pretty(),
        ) {
            Ok(()) => {
                state.dirty = false;
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Flush to {} failed ({}), in-memory state is ahead of disk: {}",
                    self.config.data_dir().display(),
                    if e.is_recoverable() { "recoverable" } else { "fatal" },
                    e
                );
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Partition value of `payload[field]`.
///
/// Strings are used as-is, numbers and booleans by their JSON text. Any
/// other shape is not indexable.
fn partition_value(payload: &Value, field: &str) -> Option<String> {
    match payload.get(field)? {
        Value::String(s) => Some(s.clone()),
        value @ (Value::Number(_) | Value::Bool(_)) => Some(value.to_string()),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
