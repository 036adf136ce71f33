// Builds one Sample from probe readings and a wall-clock read. No I/O.

use crate::models::{Readings, Sample};
use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};

/// Start of the minute containing `t` (seconds and sub-seconds zeroed).
pub fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.duration_trunc(TimeDelta::minutes(1)).unwrap_or_else(|_| {
        // Only out-of-range instants fail to round; zero the fields directly.
        t.with_nanosecond(0)
            .and_then(|t| t.with_second(0))
            .unwrap_or(t)
    })
}

pub fn assemble(now: DateTime<Utc>, readings: &Readings) -> Sample {
    let cpu = readings.cpu.as_ref();
    let memory = readings.memory.as_ref();
    let network = readings.network.as_ref();
    let storage = readings.storage.as_ref();
    Sample {
        timestamp: truncate_to_minute(now),
        cpu_usage_percent: cpu.usage_percent,
        memory_total_bytes: memory.total_bytes,
        memory_used_bytes: memory.used_bytes,
        network_in_total_bytes: network.in_total_bytes,
        network_out_total_bytes: network.out_total_bytes,
        storage_total_bytes: storage.total_bytes,
        storage_used_bytes: storage.used_bytes,
    }
}
