//! Typed accessors over the store.
//!
//! Each accessor fixes the group name and partition field for one record
//! kind and otherwise passes straight through to [`Store`]:
//!
//! | record | group  | id     | partition field |
//! |--------|--------|--------|-----------------|
//! | chat   | `chat` | chat id| `userId`        |
//! | user   | `user` | email  | none            |
//!
//! Stored values that no longer decode as the expected type are skipped
//! with a warning, the same way the store skips index entries without an
//! item.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::store::{Store, StoreStats};
use crate::types::{Chat, User};

pub const CHAT_GROUP: &str = "chat";
pub const CHAT_PARTITION_FIELD: &str = "userId";
pub const USER_GROUP: &str = "user";

fn decode<T: DeserializeOwned>(group: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("Skipping undecodable {} record: {}", group, e);
            None
        }
    }
}

// ============================================================================
// Chats
// ============================================================================

/// All chats owned by `user_id`, in creation order.
pub fn get_chats_by_user_id(store: &Store, user_id: &str) -> Vec<Chat> {
    store
        .get_by_partition(CHAT_GROUP, user_id)
        .into_iter()
        .filter_map(|value| decode(CHAT_GROUP, value))
        .collect()
}

pub fn get_chat_by_id(store: &Store, chat_id: &str) -> Option<Chat> {
    store
        .get(CHAT_GROUP, chat_id)
        .and_then(|value| decode(CHAT_GROUP, value))
}

/// Delete a chat, returning whether it existed.
pub fn delete_chat_by_id(store: &Store, chat_id: &str) -> Result<bool> {
    store.delete(CHAT_GROUP, chat_id, Some(CHAT_PARTITION_FIELD))
}

/// Delete every chat owned by `user_id`, returning how many were removed.
pub fn delete_chats_by_user_id(store: &Store, user_id: &str) -> Result<usize> {
    store.delete_by_partition(CHAT_GROUP, user_id)
}

/// Replace the chat stored under `chat_id`.
///
/// Same as insert; there is no concurrency check against the stored
/// version.
pub fn update_chat(store: &Store, chat_id: &str, chat: &Chat) -> Result<()> {
    store.set(
        CHAT_GROUP,
        chat_id,
        serde_json::to_value(chat)?,
        Some(CHAT_PARTITION_FIELD),
    )
}

pub fn insert_chat(store: &Store, chat: &Chat) -> Result<()> {
    update_chat(store, &chat.id, chat)
}

// ============================================================================
// Users
// ============================================================================

pub fn insert_user(store: &Store, user: &User) -> Result<()> {
    store.set(USER_GROUP, &user.email, serde_json::to_value(user)?, None)
}

pub fn get_user_by_email(store: &Store, email: &str) -> Option<User> {
    store
        .get(USER_GROUP, email)
        .and_then(|value| decode(USER_GROUP, value))
}

// ============================================================================
// Stats
// ============================================================================

pub fn get_stats(store: &Store) -> StoreStats {
    store.stats()
}

// ============================================================================
// TESTS
// ============================================================================
