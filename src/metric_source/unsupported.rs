// Fallback for platforms without probes: every reading is the zero value.

use super::MetricSource;
use crate::models::{CpuReading, MemoryReading, NetworkReading, Probe, StorageReading};

pub struct UnsupportedSource;

impl MetricSource for UnsupportedSource {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn cpu(&self) -> Probe<CpuReading> {
        Probe::degraded()
    }

    fn memory(&self) -> Probe<MemoryReading> {
        Probe::degraded()
    }

    fn network(&self) -> Probe<NetworkReading> {
        Probe::degraded()
    }

    fn storage(&self) -> Probe<StorageReading> {
        Probe::degraded()
    }
}
