//! Encoding and decoding of the persisted documents.
//!
//! Decoding never fails: an absent, empty or malformed document decodes to
//! an empty structure so the store can always start.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// The item table: `"<group>:<id>" -> payload`.
pub type ItemTable = BTreeMap<String, Value>;

/// Build the item table key for `(group, id)`.
pub fn item_key(group: &str, id: &str) -> String {
    format!("{group}:{id}")
}

/// Group part of an item table key.
///
/// Keys are split at the first `:`; a key without one is its own group.
pub fn key_group(key: &str) -> &str {
    key.split_once(':').map_or(key, |(group, _)| group)
}

/// Serialize a document to bytes.
pub fn encode<T: Serialize>(document: &T, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    if pretty {
        serde_json::to_vec_pretty(document)
    } else {
        serde_json::to_vec(document)
    }
}

/// Deserialize a document, falling back to `T::default()`.
///
/// `name` is only used in the log line when the content is malformed.
pub fn decode_or_default<T>(bytes: &[u8], name: &str) -> T
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }

    match serde_json::from_slice(bytes) {
        Ok(document) => document,
        Err(e) => {
            log::warn!("Ignoring malformed document {}: {}", name, e);
            T::default()
        }
    }
}
