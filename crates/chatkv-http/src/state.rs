//! Shared state for the HTTP server.
//!
//! Wraps the store handle needed by HTTP handlers.

use chatkv_core::Store;
use std::sync::Arc;

/// Shared state available to all HTTP handlers.
#[derive(Clone)]
pub struct SharedState {
    /// The open store. Closed by the owner after the server stops.
    pub store: Arc<Store>,
}

impl SharedState {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}
