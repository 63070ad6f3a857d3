//! Change feed for store mutations.
//!
//! Every mutation is broadcast once its flush succeeds, so that a UI
//! layer can drop cached pages for the affected records. Subscribers that
//! fall behind miss events (lag) rather than blocking writers.
//!
//! # Example
//!
//! ```rust
//! use chatkv_core::feed::{ChangeFeed, StoreEvent};
//!
//! let feed = ChangeFeed::new();
//! let _rx = feed.subscribe();
//!
//! assert_eq!(feed.publish(StoreEvent::set("chat", "c1")), 1);
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity for the feed.
const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Set,
    Delete,
    DeletePartition,
}

/// A single mutation as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEvent {
    pub kind: ChangeKind,
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
}

impl StoreEvent {
    pub fn set(group: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Set,
            group: group.into(),
            id: Some(id.into()),
            partition: None,
        }
    }

    pub fn delete(group: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            group: group.into(),
            id: Some(id.into()),
            partition: None,
        }
    }

    pub fn delete_partition(group: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::DeletePartition,
            group: group.into(),
            id: None,
            partition: Some(partition.into()),
        }
    }
}

/// Broadcast channel of [`StoreEvent`]s.
pub struct ChangeFeed {
    sender: broadcast::Sender<StoreEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event, returning how many subscribers received it.
    pub fn publish(&self, event: StoreEvent) -> usize {
        log::trace!("store event: {:?}", event);
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
