//! Dataset - Identifiers and History Entries

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::equipment::RawRow;
use super::summary::Summary;

/// Opaque identifier for an uploaded dataset
///
/// The server hands out integers, but the client never does arithmetic on
/// them, so both JSON numbers and strings are accepted.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct DatasetId(pub Arc<str>);

impl DatasetId {
    /// Create a new DatasetId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DatasetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DatasetId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<u64> for DatasetId {
    fn from(n: u64) -> Self {
        Self::new(n.to_string())
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for DatasetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DatasetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Int(i64),
            Str(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Int(n) => Ok(Self::new(n.to_string())),
            Wire::Str(s) if !s.trim().is_empty() => Ok(Self::new(s)),
            Wire::Str(_) => Err(serde::de::Error::custom("empty dataset id")),
        }
    }
}

/// One entry of the upload history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRef {
    pub id: DatasetId,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Full dataset as returned by the detail endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetDetail {
    /// Parsed CSV rows, keys as the server stored them
    #[serde(default)]
    pub raw_data: Vec<RawRow>,
}

/// Response of the upload endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    pub dataset_id: DatasetId,
    /// Summary computed at upload time; superseded by the summary fetch
    #[serde(default)]
    pub summary: Option<Summary>,
}

/// File name the report for `id` is saved under
pub fn report_file_name(id: &DatasetId) -> String {
    format!("report_{}.pdf", id)
}
