// Filesystem readings for the configured mount path

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReading {
    pub total_bytes: u64,
    /// `total - available`, where available is what an unprivileged caller could allocate.
    pub used_bytes: u64,
}

impl StorageReading {
    pub fn from_total_and_available(total_bytes: u64, available_bytes: u64) -> Self {
        Self {
            total_bytes,
            used_bytes: total_bytes.saturating_sub(available_bytes),
        }
    }
}
