// CPU and memory readings, plus the bundle of all four probe results

use serde::{Deserialize, Serialize};

use super::{NetworkReading, Probe, StorageReading};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuReading {
    /// Utilization across all cores. Nominally 0..=100, not clamped.
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// One result per probe, as produced by a single collection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub cpu: Probe<CpuReading>,
    pub memory: Probe<MemoryReading>,
    pub network: Probe<NetworkReading>,
    pub storage: Probe<StorageReading>,
}

impl Readings {
    /// Names of the probes that fell back to their zero value.
    pub fn degraded(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.cpu.is_degraded() {
            out.push("cpu");
        }
        if self.memory.is_degraded() {
            out.push("memory");
        }
        if self.network.is_degraded() {
            out.push("network");
        }
        if self.storage.is_degraded() {
            out.push("storage");
        }
        out
    }
}
