// Network counter readings

use serde::{Deserialize, Serialize};

/// Byte counters summed over every non-loopback interface.
/// Cumulative since boot, not per-interval deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkReading {
    pub in_total_bytes: u64,
    pub out_total_bytes: u64,
}

impl NetworkReading {
    /// Adds one interface's counters.
    pub fn add_interface(&mut self, rx_bytes: u64, tx_bytes: u64) {
        self.in_total_bytes = self.in_total_bytes.saturating_add(rx_bytes);
        self.out_total_bytes = self.out_total_bytes.saturating_add(tx_bytes);
    }
}
