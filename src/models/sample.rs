// One persisted observation

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single row of a partition. Field order matches the column order on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sample {
    /// Truncated to the start of the minute, UTC.
    pub timestamp: DateTime<Utc>,
    pub cpu_usage_percent: f64,
    pub memory_total_bytes: u64,
    pub memory_used_bytes: u64,
    pub network_in_total_bytes: u64,
    pub network_out_total_bytes: u64,
    pub storage_total_bytes: u64,
    pub storage_used_bytes: u64,
}

impl Sample {
    /// ISO-8601 with a `Z` suffix, e.g. `2024-01-01T00:01:00Z`.
    pub fn timestamp_display(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cpu={:.1}% mem={}/{} net_in={} net_out={} storage={}/{}",
            self.timestamp_display(),
            self.cpu_usage_percent,
            self.memory_used_bytes,
            self.memory_total_bytes,
            self.network_in_total_bytes,
            self.network_out_total_bytes,
            self.storage_used_bytes,
            self.storage_total_bytes,
        )
    }
}
