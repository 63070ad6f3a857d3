//! Error types for store operations.
//!
//! Missing keys are never errors: lookups return `Option` and deletes
//! report whether anything was removed. What remains are persistence
//! failures, a misconfigured document layout and use-after-close.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing a persisted document failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A document could not be serialized.
    #[error("JSON error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The items and groups documents resolve to the same file.
    #[error("Items and groups documents share the path {}", .0.display())]
    SharedDocumentPath(PathBuf),

    /// The store was closed and no longer accepts mutations.
    #[error("Store is closed")]
    Closed,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the same flush may succeed.
    ///
    /// Transient I/O conditions are recoverable; permission problems, a
    /// full disk, encoding failures and a closed store are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            StoreError::Encode(_) | StoreError::SharedDocumentPath(_) | StoreError::Closed => {
                false
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
