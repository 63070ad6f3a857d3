//! # chatkv-core
//!
//! Embedded JSON key-value store with a partition index, plus the chat and
//! user accessors built on it.
//!
//! This crate is framework-agnostic and can be used by:
//! - The HTTP server (`chatkv-http`)
//! - The daemon binary (`chatkv-daemon`)
//! - Tests and tools that open a data directory directly
//!
//! ## Key Concepts
//!
//! - **Group**: namespace for one kind of record (`chat`, `user`)
//! - **Partition key**: field value used to bucket a group's items
//!   (a chat's `userId`)
//! - **Flush**: rewriting both persisted documents after a mutation
//!
//! ## Usage
//!
//! ```no_run
//! use chatkv_core::{accessors, Chat, Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("/tmp/chatkv"))?;
//! accessors::insert_chat(&store, &Chat::new("c1", "u1").with("title", "hi"))?;
//!
//! let chats = accessors::get_chats_by_user_id(&store, "u1");
//! assert_eq!(chats.len(), 1);
//!
//! store.close()?;
//! # Ok::<(), chatkv_core::StoreError>(())
//! ```

pub mod accessors;
pub mod actions;
pub mod config;
pub mod error;
pub mod feed;
pub mod persistence;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use actions::ActionError;
pub use config::StoreConfig;
pub use error::StoreError;
pub use feed::{ChangeKind, StoreEvent};
pub use store::{Store, StoreHealth, StoreStats};
pub use types::{Chat, User};
