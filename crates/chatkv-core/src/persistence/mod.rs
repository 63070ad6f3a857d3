//! Persistence layer for the store.
//!
//! # Overview
//!
//! The store keeps everything in memory and mirrors it to two JSON
//! documents:
//!
//! - **Items** - every record, keyed by `"<group>:<id>"`
//! - **Groups** - the partition index, `group -> partition value -> [id]`
//!
//! # File Locations
//!
//! ```text
//! <data_dir>/
//! ├── items.json     # Item table
//! └── groups.json    # Partition index
//! ```
//!
//! # Design Principles
//!
//! ## Atomic Writes
//!
//! Each document is written with write-then-rename:
//!
//! 1. Write to `items.json.tmp`
//! 2. Rename to `items.json` (atomic on Unix)
//!
//! ## No Cross-Document Transaction
//!
//! The two documents are written one after the other. A crash between the
//! writes can leave ids in the index whose item is gone; the store prunes
//! those when it opens.
//!
//! ## Tolerant Loading
//!
//! Missing or malformed documents load as empty. The store always opens.

pub mod codec;
pub mod snapshot;

pub use codec::{item_key, key_group, ItemTable};
pub use snapshot::{load_snapshot, save_snapshot, snapshot_size, DocumentPaths, Snapshot};
