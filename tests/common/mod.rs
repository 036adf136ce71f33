// Shared test helpers

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use hostmetrics::metric_source::MetricSource;
use hostmetrics::models::*;

/// Returns the same readings on every call.
pub struct FixedSource {
    pub cpu: Probe<CpuReading>,
    pub memory: Probe<MemoryReading>,
    pub network: Probe<NetworkReading>,
    pub storage: Probe<StorageReading>,
}

impl Default for FixedSource {
    fn default() -> Self {
        Self {
            cpu: Probe::Ok(CpuReading {
                usage_percent: 25.0,
            }),
            memory: Probe::Ok(MemoryReading {
                total_bytes: 16 * 1024 * 1024 * 1024,
                used_bytes: 4 * 1024 * 1024 * 1024,
            }),
            network: Probe::Ok(NetworkReading {
                in_total_bytes: 1_000,
                out_total_bytes: 2_000,
            }),
            storage: Probe::Ok(StorageReading {
                total_bytes: 500_000,
                used_bytes: 200_000,
            }),
        }
    }
}

impl MetricSource for FixedSource {
    fn name(&self) -> &'static str {
        "fixed"
    }
    fn cpu(&self) -> Probe<CpuReading> {
        self.cpu
    }
    fn memory(&self) -> Probe<MemoryReading> {
        self.memory
    }
    fn network(&self) -> Probe<NetworkReading> {
        self.network
    }
    fn storage(&self) -> Probe<StorageReading> {
        self.storage
    }
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

pub fn minimal_sample(timestamp: DateTime<Utc>) -> Sample {
    Sample {
        timestamp,
        cpu_usage_percent: 10.0,
        memory_total_bytes: 1024,
        memory_used_bytes: 512,
        network_in_total_bytes: 100,
        network_out_total_bytes: 200,
        storage_total_bytes: 4096,
        storage_used_bytes: 1024,
    }
}
