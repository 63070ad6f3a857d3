//! Usage statistics and health snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of the status endpoint.
///
/// ```json
/// { "dbSize": 1234, "records": { "chat": 3, "user": 1 }, "updated": "2026-02-04T10:15:30.123Z" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Combined size of both documents on disk, in bytes.
    pub db_size: u64,

    /// Live item count per group.
    pub records: BTreeMap<String, usize>,

    /// When the snapshot was taken.
    #[serde(with = "iso_millis")]
    pub updated: DateTime<Utc>,
}

/// Whether memory and disk agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    /// In-memory state has changes the last flush did not persist.
    pub dirty: bool,

    pub closed: bool,

    /// Message of the most recent failed flush, cleared on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl StoreHealth {
    pub fn is_healthy(&self) -> bool {
        !self.dirty && self.last_error.is_none()
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
