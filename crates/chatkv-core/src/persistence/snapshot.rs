//! Whole-snapshot file I/O.
//!
//! Both documents are rewritten in full on every flush. Each write goes to
//! `<file>.tmp` first and is then renamed over `<file>`, so a crash leaves
//! either the old or the new document, never a torn one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::codec::{decode_or_default, encode, ItemTable};
use crate::error::{Result, StoreError};
use crate::store::PartitionIndex;

/// Locations of the two persisted documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    pub items: PathBuf,
    pub groups: PathBuf,
}

impl DocumentPaths {
    pub fn new(dir: &Path, items_file: &str, groups_file: &str) -> Self {
        Self {
            items: dir.join(items_file),
            groups: dir.join(groups_file),
        }
    }
}

/// In-memory contents of both documents.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub items: ItemTable,
    pub index: PartitionIndex,
}

/// Load both documents.
///
/// A missing, unreadable or malformed document loads as empty.
pub fn load_snapshot(paths: &DocumentPaths) -> Snapshot {
    let index = decode_or_default(&read_document(&paths.groups), &display_name(&paths.groups));
    let items = decode_or_default(&read_document(&paths.items), &display_name(&paths.items));
    Snapshot { items, index }
}

/// Write both documents, item table first.
pub fn save_snapshot(
    paths: &DocumentPaths,
    items: &ItemTable,
    index: &PartitionIndex,
    pretty: bool,
) -> Result<()> {
    write_atomic(&paths.items, &encode(items, pretty)?)?;
    write_atomic(&paths.groups, &encode(index, pretty)?)?;
    Ok(())
}

/// Combined on-disk size of both documents in bytes.
///
/// A missing document counts as zero.
pub fn snapshot_size(paths: &DocumentPaths) -> u64 {
    file_size(&paths.items) + file_size(&paths.groups)
}

fn read_document(path: &Path) -> Vec<u8> {
    match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            log::warn!("Failed to read {}, starting empty: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, bytes).map_err(|e| StoreError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::codec::item_key;
    use serde_json::json;
    use tempfile::tempdir;

    fn paths_in(dir: &Path) -> DocumentPaths {
        DocumentPaths::new(dir, "items.json", "groups.json")
    }

    fn sample() -> (ItemTable, PartitionIndex) {
        let mut items = ItemTable::new();
        items.insert(item_key("chat", "c1"), json!({"id": "c1", "userId": "u1"}));
        let mut index = PartitionIndex::new();
        index.insert("chat", "u1", "c1");
        (items, index)
    }

    #[test]
    fn load_from_empty_dir_is_empty() {
        let dir = tempdir().unwrap();
        let snapshot = load_snapshot(&paths_in(dir.path()));

        assert!(snapshot.items.is_empty());
        assert!(snapshot.index.is_empty());
    }

    #[test]
    fn save_and_load_snapshot() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        let (items, index) = sample();

        save_snapshot(&paths, &items, &index, false).unwrap();
        let loaded = load_snapshot(&paths);

        assert_eq!(loaded.items, items);
        assert_eq!(loaded.index, index);
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        let (items, index) = sample();

        save_snapshot(&paths, &items, &index, false).unwrap();

        assert!(paths.items.exists());
        assert!(paths.groups.exists());
        assert!(!dir.path().join("items.json.tmp").exists());
        assert!(!dir.path().join("groups.json.tmp").exists());
    }

    #[test]
    fn save_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let paths = paths_in(&nested);
        let (items, index) = sample();

        save_snapshot(&paths, &items, &index, true).unwrap();

        assert!(nested.join("items.json").exists());
    }

    #[test]
    fn malformed_document_loads_empty_without_touching_the_other() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        let (items, index) = sample();
        save_snapshot(&paths, &items, &index, false).unwrap();

        fs::write(&paths.groups, "{{{ broken").unwrap();
        let loaded = load_snapshot(&paths);

        assert_eq!(loaded.items, items);
        assert!(loaded.index.is_empty());
    }

    #[test]
    fn snapshot_size_sums_both_files() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        assert_eq!(snapshot_size(&paths), 0);

        fs::write(&paths.items, "12345").unwrap();
        assert_eq!(snapshot_size(&paths), 5);

        fs::write(&paths.groups, "123").unwrap();
        assert_eq!(snapshot_size(&paths), 8);
    }

    #[test]
    fn save_into_a_file_path_fails_with_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let paths = paths_in(&blocker);
        let (items, index) = sample();

        let result = save_snapshot(&paths, &items, &index, false);

        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
