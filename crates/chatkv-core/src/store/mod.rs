//! The key-value store and its partition index.
//!
//! - [`Store`] - owns the item table and index, single point of mutation
//! - [`PartitionIndex`] - `group -> partition value -> [id]`
//! - [`StoreStats`] / [`StoreHealth`] - status snapshots

pub mod index;
pub mod kv;
pub mod stats;

pub use index::PartitionIndex;
pub use kv::Store;
pub use stats::{StoreHealth, StoreStats};
