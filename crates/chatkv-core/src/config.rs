//! Store configuration.
//!
//! Built either explicitly through [`StoreConfig::builder`] or from the
//! environment:
//!
//! - `CHATKV_DATA_DIR` - directory holding the documents
//! - `CHATKV_ENV` - when `production` and no data dir is set, defaults to
//!   `/chatkv-data`; otherwise the current directory is used

use std::env;
use std::path::{Path, PathBuf};

use crate::persistence::DocumentPaths;

pub const DATA_DIR_ENV: &str = "CHATKV_DATA_DIR";
pub const ENV_ENV: &str = "CHATKV_ENV";
pub const PRODUCTION_DATA_DIR: &str = "/chatkv-data";

pub const DEFAULT_ITEMS_FILE: &str = "items.json";
pub const DEFAULT_GROUPS_FILE: &str = "groups.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    data_dir: PathBuf,
    items_file: String,
    groups_file: String,
    pretty: bool,
}

impl StoreConfig {
    /// Config with default file names rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::builder().data_dir(data_dir).build()
    }

    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::new()
    }

    /// Resolve the config from `CHATKV_DATA_DIR` / `CHATKV_ENV`.
    pub fn from_env() -> Self {
        Self::new(data_dir_from_env())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn document_paths(&self) -> DocumentPaths {
        DocumentPaths::new(&self.data_dir, &self.items_file, &self.groups_file)
    }
}

/// Builder for [`StoreConfig`].
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    data_dir: Option<PathBuf>,
    items_file: Option<String>,
    groups_file: Option<String>,
    pretty: bool,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn items_file(mut self, name: impl Into<String>) -> Self {
        self.items_file = Some(name.into());
        self
    }

    pub fn groups_file(mut self, name: impl Into<String>) -> Self {
        self.groups_file = Some(name.into());
        self
    }

    /// Write pretty-printed JSON (easier to inspect, larger on disk).
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Build the config. Without an explicit data dir the environment
    /// decides.
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            data_dir: self.data_dir.unwrap_or_else(data_dir_from_env),
            items_file: self
                .items_file
                .unwrap_or_else(|| DEFAULT_ITEMS_FILE.to_string()),
            groups_file: self
                .groups_file
                .unwrap_or_else(|| DEFAULT_GROUPS_FILE.to_string()),
            pretty: self.pretty,
        }
    }
}

fn data_dir_from_env() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    match env::var(ENV_ENV) {
        Ok(value) if value == "production" => PathBuf::from(PRODUCTION_DATA_DIR),
        _ => PathBuf::from("."),
    }
}
