// Host metric probes. One `MetricSource` per platform, chosen once at startup.
// Probes never fail outward: any error degrades to the zero reading.

mod darwin;
mod linux;
mod network;
mod storage;
mod unsupported;

pub use darwin::{CommandRunner, DarwinSource, SystemCommands};
pub use linux::LinuxSource;
pub use storage::StorageProbe;
pub use unsupported::UnsupportedSource;

use crate::config::ProbesConfig;
use crate::models::{CpuReading, MemoryReading, NetworkReading, Probe, Readings, StorageReading};
use std::sync::Arc;
use std::time::Duration;

/// Interface names starting with this prefix are loopback and never counted.
pub const LOOPBACK_PREFIX: &str = "lo";

/// The four probe operations, implemented once per platform.
pub trait MetricSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn cpu(&self) -> Probe<CpuReading>;
    fn memory(&self) -> Probe<MemoryReading>;
    fn network(&self) -> Probe<NetworkReading>;
    fn storage(&self) -> Probe<StorageReading>;
}

/// Picks the source for the running OS.
pub fn select_source(config: &ProbesConfig) -> Arc<dyn MetricSource> {
    source_for_os(std::env::consts::OS, config)
}

pub fn source_for_os(os: &str, config: &ProbesConfig) -> Arc<dyn MetricSource> {
    let storage = StorageProbe::new(&config.storage_mount);
    match os {
        "linux" => Arc::new(LinuxSource::new(
            Duration::from_millis(config.cpu_sample_window_ms),
            storage,
        )),
        "macos" => Arc::new(DarwinSource::new(storage)),
        other => {
            tracing::warn!(
                os = other,
                "no metric source for this platform; samples will be zero"
            );
            Arc::new(UnsupportedSource)
        }
    }
}

/// Runs all four probes concurrently on the blocking pool.
pub async fn collect(source: Arc<dyn MetricSource>) -> Readings {
    let (cpu, memory, network, storage) = tokio::join!(
        run_probe(source.clone(), "cpu", |s| s.cpu()),
        run_probe(source.clone(), "memory", |s| s.memory()),
        run_probe(source.clone(), "network", |s| s.network()),
        run_probe(source, "storage", |s| s.storage()),
    );
    Readings {
        cpu,
        memory,
        network,
        storage,
    }
}

async fn run_probe<T, F>(source: Arc<dyn MetricSource>, probe: &'static str, f: F) -> Probe<T>
where
    T: Default + Send + 'static,
    F: FnOnce(&dyn MetricSource) -> Probe<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(source.as_ref())).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, probe, "probe task join failed");
            Probe::degraded()
        }
    }
}

/// Converts a fallible read into a tagged probe result, logging the failure.
pub(crate) fn absorb<T: Default>(
    source: &'static str,
    probe: &'static str,
    result: anyhow::Result<T>,
) -> Probe<T> {
    match result {
        Ok(v) => Probe::Ok(v),
        Err(e) => {
            tracing::debug!(error = %e, source, probe, "probe degraded to zero");
            Probe::degraded()
        }
    }
}
