//! HTTP route handlers.
//!
//! Every handler is a thin wrapper: read the caller, call into
//! `chatkv_core::actions`, map the result to a status code.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chatkv_core::{actions, ActionError, Chat, StoreHealth, StoreStats};
use serde::Serialize;
use std::sync::Arc;

use crate::identity::Caller;
use crate::SharedState;

/// Error response: `{"error": "<message>"}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Action(ActionError),
    NotFound,
}

impl From<ActionError> for ApiError {
    fn from(e: ActionError) -> Self {
        ApiError::Action(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Action(ActionError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, ActionError::Unauthorized.to_string())
            }
            ApiError::Action(ActionError::NotShareable) => {
                (StatusCode::BAD_REQUEST, ActionError::NotShareable.to_string())
            }
            ApiError::Action(ActionError::Store(e)) => {
                log::error!("Store failure while handling request: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

/// GET /api/status
pub async fn status(State(state): State<Arc<SharedState>>) -> Json<StoreStats> {
    Json(state.store.stats())
}

/// GET /api/health
///
/// 200 while memory and disk agree, 503 once a flush has failed.
pub async fn health(State(state): State<Arc<SharedState>>) -> (StatusCode, Json<StoreHealth>) {
    let health = state.store.health();
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

/// GET /api/chats
pub async fn list_chats(State(state): State<Arc<SharedState>>, caller: Caller) -> Json<Vec<Chat>> {
    Json(actions::get_chats(&state.store, caller.user_id()))
}

/// POST /api/chats
pub async fn save_chat(
    State(state): State<Arc<SharedState>>,
    caller: Caller,
    Json(chat): Json<Chat>,
) -> Result<StatusCode, ApiError> {
    if actions::save_chat(&state.store, caller.user_id(), &chat)? {
        Ok(StatusCode::CREATED)
    } else {
        Err(ActionError::Unauthorized.into())
    }
}

/// DELETE /api/chats
pub async fn clear_chats(
    State(state): State<Arc<SharedState>>,
    caller: Caller,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = actions::clear_chats(&state.store, caller.user_id())?;
    Ok(Json(DeletedResponse { deleted }))
}

/// GET /api/chats/{id}
pub async fn get_chat(
    State(state): State<Arc<SharedState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Chat>, ApiError> {
    let user_id = caller.user_id().ok_or(ActionError::Unauthorized)?;
    actions::get_chat(&state.store, &id, user_id)
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// DELETE /api/chats/{id}
pub async fn remove_chat(
    State(state): State<Arc<SharedState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    actions::remove_chat(&state.store, caller.user_id(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/chats/{id}/share
pub async fn share_chat(
    State(state): State<Arc<SharedState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Chat>, ApiError> {
    Ok(Json(actions::share_chat(&state.store, caller.user_id(), &id)?))
}

/// GET /api/share/{id}
pub async fn get_shared_chat(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<String>,
) -> Result<Json<Chat>, ApiError> {
    actions::get_shared_chat(&state.store, &id)
        .map(Json)
        .ok_or(ApiError::NotFound)
}
