//! Partition index.
//!
//! A two-level mapping `group -> partition value -> [id]` used to list
//! every item of a group sharing a partition value (e.g. all chats owned by
//! one user) without scanning the item table.
//!
//! # Format
//!
//! Persisted as `groups.json`:
//!
//! ```json
//! {
//!   "chat": {
//!     "u1": ["c1", "c2"],
//!     "u2": ["c3"]
//!   }
//! }
//! ```
//!
//! Buckets are created lazily on first insert. Ids within a bucket are
//! unique and keep insertion order. Only ids are stored, never payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

type Buckets = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionIndex {
    groups: BTreeMap<String, Buckets>,
}

impl PartitionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` to the `(group, key)` bucket, creating it if needed.
    ///
    /// Returns `false` if the id was already present.
    pub fn insert(&mut self, group: &str, key: &str, id: &str) -> bool {
        let bucket = self
            .groups
            .entry(group.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default();

        if bucket.iter().any(|existing| existing == id) {
            return false;
        }
        bucket.push(id.to_string());
        true
    }

    /// Remove `id` from a single bucket. The bucket itself is kept.
    pub fn remove(&mut self, group: &str, key: &str, id: &str) -> bool {
        let Some(bucket) = self.groups.get_mut(group).and_then(|b| b.get_mut(key)) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|existing| existing != id);
        bucket.len() != before
    }

    /// Remove `id` from every bucket of `group`, returning how many
    /// buckets listed it.
    pub fn remove_everywhere(&mut self, group: &str, id: &str) -> usize {
        let Some(buckets) = self.groups.get_mut(group) else {
            return 0;
        };
        let mut removed = 0;
        for bucket in buckets.values_mut() {
            let before = bucket.len();
            bucket.retain(|existing| existing != id);
            removed += before - bucket.len();
        }
        removed
    }

    /// Ids in the `(group, key)` bucket, in insertion order.
    pub fn ids(&self, group: &str, key: &str) -> &[String] {
        self.groups
            .get(group)
            .and_then(|buckets| buckets.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, group: &str, key: &str, id: &str) -> bool {
        self.ids(group, key).iter().any(|existing| existing == id)
    }

    /// Drop a bucket entirely, returning the ids it held.
    ///
    /// The group entry goes too once its last bucket is gone.
    pub fn remove_bucket(&mut self, group: &str, key: &str) -> Option<Vec<String>> {
        let buckets = self.groups.get_mut(group)?;
        let removed = buckets.remove(key);
        if buckets.is_empty() {
            self.groups.remove(group);
        }
        removed
    }

    /// Keep only the ids for which `keep(group, key, id)` holds.
    ///
    /// Returns the number of ids dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &str, &str) -> bool,
    {
        let mut dropped = 0;
        for (group, buckets) in self.groups.iter_mut() {
            for (key, bucket) in buckets.iter_mut() {
                let before = bucket.len();
                bucket.retain(|id| keep(group, key, id));
                dropped += before - bucket.len();
            }
        }
        dropped
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
