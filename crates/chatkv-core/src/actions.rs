//! Chat actions: ownership checks in front of the typed accessors.
//!
//! The caller identity is an opaque user id resolved by an external auth
//! layer; `None` means the request is unauthenticated. The store never
//! authenticates, so every check that a chat belongs to the caller happens
//! here.

use thiserror::Error;

use crate::accessors;
use crate::error::StoreError;
use crate::store::Store;
use crate::types::Chat;

#[derive(Error, Debug)]
pub enum ActionError {
    /// No caller, or the caller does not own the chat.
    #[error("Unauthorized")]
    Unauthorized,

    /// The chat is missing or belongs to someone else.
    #[error("Something went wrong")]
    NotShareable,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Public path under which a shared chat is served.
pub fn share_path(chat_id: &str) -> String {
    format!("/share/{chat_id}")
}

/// Chats owned by `user_id`; empty when there is no user.
pub fn get_chats(store: &Store, user_id: Option<&str>) -> Vec<Chat> {
    match user_id {
        Some(user_id) if !user_id.is_empty() => accessors::get_chats_by_user_id(store, user_id),
        _ => Vec::new(),
    }
}

/// A chat, provided it belongs to `user_id`.
///
/// An empty `user_id` skips the ownership check.
pub fn get_chat(store: &Store, chat_id: &str, user_id: &str) -> Option<Chat> {
    accessors::get_chat_by_id(store, chat_id)
        .filter(|chat| user_id.is_empty() || chat.is_owned_by(user_id))
}

/// Delete one of the caller's chats.
///
/// A missing chat is reported as `Unauthorized`, the same as someone
/// else's, so callers cannot probe for ids.
pub fn remove_chat(store: &Store, caller: Option<&str>, chat_id: &str) -> Result<(), ActionError> {
    let caller = caller.ok_or(ActionError::Unauthorized)?;

    let owner = accessors::get_chat_by_id(store, chat_id).map(|chat| chat.user_id);
    if owner.as_deref() != Some(caller) {
        return Err(ActionError::Unauthorized);
    }

    accessors::delete_chat_by_id(store, chat_id)?;
    Ok(())
}

/// Delete every chat of the caller, returning how many were removed.
pub fn clear_chats(store: &Store, caller: Option<&str>) -> Result<usize, ActionError> {
    let caller = caller
        .filter(|id| !id.is_empty())
        .ok_or(ActionError::Unauthorized)?;
    Ok(accessors::delete_chats_by_user_id(store, caller)?)
}

/// A chat that has been shared; `None` otherwise.
pub fn get_shared_chat(store: &Store, chat_id: &str) -> Option<Chat> {
    accessors::get_chat_by_id(store, chat_id).filter(|chat| chat.share_path.is_some())
}

/// Mark one of the caller's chats as shared and return it.
pub fn share_chat(store: &Store, caller: Option<&str>, chat_id: &str) -> Result<Chat, ActionError> {
    let caller = caller
        .filter(|id| !id.is_empty())
        .ok_or(ActionError::Unauthorized)?;

    let mut chat = accessors::get_chat_by_id(store, chat_id)
        .filter(|chat| chat.is_owned_by(caller))
        .ok_or(ActionError::NotShareable)?;

    chat.share_path = Some(share_path(&chat.id));
    accessors::update_chat(store, chat_id, &chat)?;

    Ok(chat)
}

/// Save a chat for the caller.
///
/// Unauthenticated saves are dropped (`Ok(false)`). Saving a chat owned by
/// someone else is rejected.
pub fn save_chat(store: &Store, caller: Option<&str>, chat: &Chat) -> Result<bool, ActionError> {
    let Some(caller) = caller else {
        log::debug!("Dropping unauthenticated save of chat {}", chat.id);
        return Ok(false);
    };
    if !chat.is_owned_by(caller) {
        return Err(ActionError::Unauthorized);
    }

    accessors::insert_chat(store, chat)?;
    Ok(true)
}

// ============================================================================
// TESTS
// ============================================================================
