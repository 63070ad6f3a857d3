//! Record types stored through the typed accessors.
//!
//! The store itself only sees JSON values. These types pin down the few
//! fields the accessors and actions rely on (id, owner, share path, email)
//! and carry every other field through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat, owned by one user.
///
/// Stored in group `chat`, partitioned by `userId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Unique chat identifier.
    pub id: String,

    /// Owning user; the partition key.
    pub user_id: String,

    /// Public path once the chat has been shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_path: Option<String>,

    /// Everything else (title, messages, timestamps, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chat {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            share_path: None,
            extra: Map::new(),
        }
    }

    /// Set an extra field, builder style.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// A user account, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}
