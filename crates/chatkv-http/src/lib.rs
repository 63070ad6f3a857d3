//! HTTP surface for chatkv.
//!
//! Exposes the chat actions and the store status over REST:
//!
//! | method | path                     | action            |
//! |--------|--------------------------|-------------------|
//! | GET    | `/api/status`            | store stats       |
//! | GET    | `/api/health`            | flush health      |
//! | GET    | `/api/chats`             | caller's chats    |
//! | POST   | `/api/chats`             | save chat         |
//! | DELETE | `/api/chats`             | clear chats       |
//! | GET    | `/api/chats/{id}`        | get chat          |
//! | DELETE | `/api/chats/{id}`        | remove chat       |
//! | POST   | `/api/chats/{id}/share`  | share chat        |
//! | GET    | `/api/share/{id}`        | get shared chat   |
//!
//! The caller is identified by the `x-user-id` header (see [`identity`]).

pub mod identity;
pub mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use state::SharedState;

/// Build the router over the given state.
pub fn router(state: Arc<SharedState>) -> Router {
    Router::new()
        .route("/api/status", get(routes::status))
        .route("/api/health", get(routes::health))
        .route(
            "/api/chats",
            get(routes::list_chats)
                .post(routes::save_chat)
                .delete(routes::clear_chats),
        )
        .route(
            "/api/chats/{id}",
            get(routes::get_chat).delete(routes::remove_chat),
        )
        .route("/api/chats/{id}/share", post(routes::share_chat))
        .route("/api/share/{id}", get(routes::get_shared_chat))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<SharedState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log::info!("HTTP server listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            log::info!("HTTP server shutting down");
        })
        .await
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use chatkv_core::{accessors, Chat, Store, StoreConfig};
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    use crate::identity::USER_ID_HEADER;

    fn test_state() -> (TempDir, Arc<SharedState>) {
        let dir = tempdir().unwrap();
        let store = Store::open(StoreConfig::new(dir.path())).unwrap();
        accessors::insert_chat(&store, &Chat::new("c1", "alice").with("title", "hi")).unwrap();
        accessors::insert_chat(&store, &Chat::new("c2", "bob").with("title", "yo")).unwrap();
        (dir, Arc::new(SharedState::new(Arc::new(store))))
    }

    async fn send(
        state: &Arc<SharedState>,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    mod status {
        use super::*;

        #[tokio::test]
        async fn status_reports_stats_contract() {
            let (_dir, state) = test_state();
            let (status, body) = send(&state, Method::GET, "/api/status", None, None).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["records"]["chat"], 2);
            assert!(body["dbSize"].as_u64().unwrap() > 0);
            assert!(body["updated"].as_str().unwrap().ends_with('Z'));
        }

        #[tokio::test]
        async fn health_is_ok_for_clean_store() {
            let (_dir, state) = test_state();
            let (status, body) = send(&state, Method::GET, "/api/health", None, None).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["dirty"], false);
        }
    }

    mod chats {
        use super::*;

        #[tokio::test]
        async fn list_chats_returns_only_callers() {
            let (_dir, state) = test_state();
            let (status, body) = send(&state, Method::GET, "/api/chats", Some("alice"), None).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!([{"id": "c1", "userId": "alice", "title": "hi"}]));
        }

        #[tokio::test]
        async fn list_chats_anonymous_is_empty() {
            let (_dir, state) = test_state();
            let (status, body) = send(&state, Method::GET, "/api/chats", None, None).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!([]));
        }

        #[tokio::test]
        async fn get_chat_enforces_ownership() {
            let (_dir, state) = test_state();

            let (status, body) =
                send(&state, Method::GET, "/api/chats/c1", Some("alice"), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["title"], "hi");

            let (status, _) = send(&state, Method::GET, "/api/chats/c1", Some("bob"), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (status, body) = send(&state, Method::GET, "/api/chats/c1", None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "Unauthorized");
        }

        #[tokio::test]
        async fn save_chat_creates_for_owner() {
            let (_dir, state) = test_state();
            let chat = json!({"id": "c3", "userId": "alice", "title": "new"});

            let (status, _) =
                send(&state, Method::POST, "/api/chats", Some("alice"), Some(chat)).await;
            assert_eq!(status, StatusCode::CREATED);

            let (_, body) = send(&state, Method::GET, "/api/chats", Some("alice"), None).await;
            assert_eq!(body.as_array().unwrap().len(), 2);
        }

        #[tokio::test]
        async fn save_chat_rejects_anonymous_and_foreign() {
            let (_dir, state) = test_state();
            let chat = json!({"id": "c3", "userId": "alice"});

            let (status, _) =
                send(&state, Method::POST, "/api/chats", None, Some(chat.clone())).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);

            let (status, _) =
                send(&state, Method::POST, "/api/chats", Some("bob"), Some(chat)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn remove_chat_requires_owner() {
            let (_dir, state) = test_state();

            let (status, _) =
                send(&state, Method::DELETE, "/api/chats/c1", Some("bob"), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);

            let (status, _) =
                send(&state, Method::DELETE, "/api/chats/c1", Some("alice"), None).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
            assert!(state.store.get("chat", "c1").is_none());
        }

        #[tokio::test]
        async fn clear_chats_deletes_callers_chats() {
            let (_dir, state) = test_state();

            let (status, body) =
                send(&state, Method::DELETE, "/api/chats", Some("alice"), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["deleted"], 1);
            assert!(state.store.get("chat", "c2").is_some());

            let (status, _) = send(&state, Method::DELETE, "/api/chats", None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }

    mod sharing {
        use super::*;

        #[tokio::test]
        async fn share_then_fetch_publicly() {
            let (_dir, state) = test_state();

            let (status, _) = send(&state, Method::GET, "/api/share/c1", None, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (status, body) =
                send(&state, Method::POST, "/api/chats/c1/share", Some("alice"), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["sharePath"], "/share/c1");

            let (status, body) = send(&state, Method::GET, "/api/share/c1", None, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["id"], "c1");
        }

        #[tokio::test]
        async fn share_foreign_chat_fails() {
            let (_dir, state) = test_state();

            let (status, body) =
                send(&state, Method::POST, "/api/chats/c1/share", Some("bob"), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Something went wrong");
        }
    }

    #[tokio::test]
    async fn closed_store_yields_server_error() {
        let (_dir, state) = test_state();
        state.store.close().unwrap();

        let (status, body) = send(&state, Method::DELETE, "/api/chats", Some("alice"), None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Store is closed");
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let (_dir, state) = test_state();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, state, async {
            rx.await.ok();
        }));
        tx.send(()).unwrap();

        server.await.unwrap().unwrap();
    }
}
