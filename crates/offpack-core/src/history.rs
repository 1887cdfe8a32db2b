//! Download history domain model

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Number of most recent entries kept in the history
pub const HISTORY_LIMIT: usize = 50;

/// Record of one completed download/pack operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(default)]
    pub package_names: Vec<String>,
    pub output_path: String,
}

impl HistoryEntry {
    pub fn new(package_names: Vec<String>, output_path: String) -> Self {
        Self::at(OffsetDateTime::now_utc(), package_names, output_path)
    }

    pub fn at(at: OffsetDateTime, package_names: Vec<String>, output_path: String) -> Self {
        Self {
            id: format!("download_{}", uuid::Uuid::new_v4().simple()),
            timestamp: (at.unix_timestamp_nanos() / 1_000_000) as i64,
            package_names,
            output_path,
        }
    }

    pub fn recorded_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(self.timestamp as i128 * 1_000_000).ok()
    }
}
