// Linux probes: /proc/stat and /proc/meminfo. Network and storage are shared with macOS.

use super::{MetricSource, StorageProbe, absorb, network};
use crate::models::{CpuReading, MemoryReading, NetworkReading, Probe, StorageReading};
use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;
use tracing::instrument;

pub struct LinuxSource {
    proc_root: PathBuf,
    cpu_window: Duration,
    storage: StorageProbe,
}

impl LinuxSource {
    pub fn new(cpu_window: Duration, storage: StorageProbe) -> Self {
        Self::with_proc_root("/proc", cpu_window, storage)
    }

    /// Reads procfs files from `proc_root` instead of `/proc`.
    pub fn with_proc_root(
        proc_root: impl Into<PathBuf>,
        cpu_window: Duration,
        storage: StorageProbe,
    ) -> Self {
        Self {
            proc_root: proc_root.into(),
            cpu_window,
            storage,
        }
    }

    fn read_proc(&self, name: &str) -> anyhow::Result<String> {
        let path = self.proc_root.join(name);
        std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }

    fn read_cpu(&self) -> anyhow::Result<CpuReading> {
        let first = self.read_proc("stat")?;
        std::thread::sleep(self.cpu_window);
        let second = self.read_proc("stat")?;
        let a = parse_cpu_times(&first).context("no aggregate cpu line in stat")?;
        let b = parse_cpu_times(&second).context("no aggregate cpu line in stat")?;
        Ok(CpuReading {
            usage_percent: busy_percent(a, b),
        })
    }

    fn read_memory(&self) -> anyhow::Result<MemoryReading> {
        let content = self.read_proc("meminfo")?;
        parse_meminfo(&content).context("MemTotal missing from meminfo")
    }
}

impl MetricSource for LinuxSource {
    fn name(&self) -> &'static str {
        "linux"
    }

    #[instrument(skip(self), fields(source = "linux", operation = "cpu"))]
    fn cpu(&self) -> Probe<CpuReading> {
        absorb("linux", "cpu", self.read_cpu())
    }

    #[instrument(skip(self), fields(source = "linux", operation = "memory"))]
    fn memory(&self) -> Probe<MemoryReading> {
        absorb("linux", "memory", self.read_memory())
    }

    #[instrument(skip(self), fields(source = "linux", operation = "network"))]
    fn network(&self) -> Probe<NetworkReading> {
        absorb("linux", "network", network::read())
    }

    #[instrument(skip(self), fields(source = "linux", operation = "storage"))]
    fn storage(&self) -> Probe<StorageReading> {
        absorb("linux", "storage", self.storage.read())
    }
}

/// Idle and total ticks from the aggregate `cpu` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

/// Parses the first `cpu ` line: user nice system idle iowait irq softirq.
pub(super) fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(7)
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;
    if fields.len() < 4 {
        return None;
    }
    Some(CpuTimes {
        idle: fields[3],
        total: fields.iter().sum(),
    })
}

/// `100 * (1 - d_idle / d_total)`; 0 when no ticks elapsed.
pub(super) fn busy_percent(before: CpuTimes, after: CpuTimes) -> f64 {
    let d_total = after.total.saturating_sub(before.total);
    if d_total == 0 {
        return 0.0;
    }
    let d_idle = after.idle.saturating_sub(before.idle);
    100.0 * (1.0 - d_idle as f64 / d_total as f64)
}

/// `used = MemTotal - MemFree - Buffers - Cached`. Values in meminfo are kB.
pub(super) fn parse_meminfo(content: &str) -> Option<MemoryReading> {
    let mut total = None;
    let mut free = 0u64;
    let mut buffers = 0u64;
    let mut cached = 0u64;
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(kb) = value.parse::<u64>() else {
            continue;
        };
        let bytes = kb.saturating_mul(1024);
        match key.trim_end_matches(':') {
            "MemTotal" => total = Some(bytes),
            "MemFree" => free = bytes,
            "Buffers" => buffers = bytes,
            "Cached" => cached = bytes,
            _ => {}
        }
    }
    let total = total?;
    Some(MemoryReading {
        total_bytes: total,
        used_bytes: total
            .saturating_sub(free)
            .saturating_sub(buffers)
            .saturating_sub(cached),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_A: &str = "cpu  100 0 50 800 10 0 40 0 0 0\ncpu0 50 0 25 400 5 0 20 0 0 0\nintr 1\n";
    const STAT_B: &str = "cpu  160 0 70 900 10 0 60 0 0 0\ncpu0 80 0 35 450 5 0 30 0 0 0\nintr 2\n";

    #[test]
    fn cpu_times_use_first_seven_counters() {
        let t = parse_cpu_times(STAT_A).unwrap();
        assert_eq!(t.idle, 800);
        assert_eq!(t.total, 100 + 50 + 800 + 10 + 40);
    }

    #[test]
    fn busy_percent_from_two_snapshots() {
        let a = parse_cpu_times(STAT_A).unwrap();
        let b = parse_cpu_times(STAT_B).unwrap();
        // d_total = 200, d_idle = 100
        assert!((busy_percent(a, b) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn busy_percent_zero_when_no_ticks_elapsed() {
        let a = parse_cpu_times(STAT_A).unwrap();
        assert_eq!(busy_percent(a, a), 0.0);
    }

    #[test]
    fn cpu_times_reject_garbage() {
        assert!(parse_cpu_times("cpu  a b c d\n").is_none());
        assert!(parse_cpu_times("intr 1\n").is_none());
    }

    #[test]
    fn meminfo_used_excludes_buffers_and_cache() {
        let content = "MemTotal:       16000 kB\nMemFree:         4000 kB\nMemAvailable:    9000 kB\nBuffers:          500 kB\nCached:          2500 kB\n";
        let m = parse_meminfo(content).unwrap();
        assert_eq!(m.total_bytes, 16000 * 1024);
        assert_eq!(m.used_bytes, 9000 * 1024);
    }

    #[test]
    fn meminfo_without_total_is_none() {
        assert!(parse_meminfo("MemFree: 10 kB\n").is_none());
    }
}
