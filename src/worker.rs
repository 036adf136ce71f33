// Collector loop: probes -> assembler -> partition append -> (scheduled) retention sweep.
// Each step's failure is logged and isolated; nothing here stops the loop except
// single-shot completion or the shutdown signal.

use crate::assembler;
use crate::metric_source::{self, MetricSource};
use crate::models::Sample;
use crate::partition_repo::PartitionRepo;
use crate::retention;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::Instrument;

/// Everything one cycle needs.
pub struct CycleDeps {
    pub source: Arc<dyn MetricSource>,
    pub repo: Arc<PartitionRepo>,
    pub retention_days: u32,
    /// A sweep runs when this schedule includes the cycle's (truncated) minute.
    pub sweep_schedule: cron::Schedule,
}

/// Outcome of one cycle. Errors are kept as their display text.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub sample: Sample,
    /// Probes that fell back to zero this cycle.
    pub degraded: Vec<&'static str>,
    pub append: Result<PathBuf, String>,
    /// `None` when no sweep was scheduled for this minute.
    pub sweep: Option<Result<usize, String>>,
}

impl CycleReport {
    pub fn appended(&self) -> bool {
        self.append.is_ok()
    }
}

/// Running totals, logged periodically and returned when the worker stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub cycles_total: u64,
    pub append_failures: u64,
    pub sweeps_total: u64,
    pub sweep_failures: u64,
    pub partitions_swept: u64,
    pub degraded_probes: u64,
}

impl WorkerStats {
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles_total += 1;
        self.degraded_probes += report.degraded.len() as u64;
        if !report.appended() {
            self.append_failures += 1;
        }
        match &report.sweep {
            Some(Ok(n)) => {
                self.sweeps_total += 1;
                self.partitions_swept += *n as u64;
            }
            Some(Err(_)) => {
                self.sweeps_total += 1;
                self.sweep_failures += 1;
            }
            None => {}
        }
    }
}

/// Dependencies plus the shutdown signal for the loop.
pub struct WorkerDeps {
    pub cycle: CycleDeps,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    pub sample_interval_secs: u64,
    /// How often to log collector stats (real seconds).
    pub stats_log_interval_secs: u64,
    /// Stop after the first full cycle.
    pub once: bool,
}

/// One cycle at the current wall clock.
pub async fn run_once(deps: &CycleDeps) -> CycleReport {
    run_cycle(deps, Utc::now()).await
}

/// One cycle with an explicit wall-clock read, which stamps the sample and
/// decides whether a sweep is due.
pub async fn run_cycle(deps: &CycleDeps, now: DateTime<Utc>) -> CycleReport {
    let readings = metric_source::collect(deps.source.clone()).await;
    let degraded = readings.degraded();
    if !degraded.is_empty() {
        tracing::debug!(probes = ?degraded, source = deps.source.name(), "probes degraded");
    }
    let sample = assembler::assemble(now, &readings);

    let append = {
        let repo = deps.repo.clone();
        let sample = sample.clone();
        match tokio::task::spawn_blocking(move || repo.append(&sample)).await {
            Ok(Ok(path)) => Ok(path),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("append task join: {}", e)),
        }
    };
    match &append {
        Ok(path) => tracing::debug!(
            operation = "append",
            path = %path.display(),
            sample = %sample,
            "sample appended"
        ),
        Err(e) => tracing::warn!(error = %e, operation = "append", "Failed to write metrics"),
    }

    let sweep = if deps.sweep_schedule.includes(sample.timestamp) {
        Some(run_sweep(deps, now).await)
    } else {
        None
    };

    CycleReport {
        sample,
        degraded,
        append,
        sweep,
    }
}

async fn run_sweep(deps: &CycleDeps, now: DateTime<Utc>) -> Result<usize, String> {
    let dir = deps.repo.dir().to_path_buf();
    let max_days = deps.retention_days;
    let result =
        match tokio::task::spawn_blocking(move || retention::sweep_at(&dir, max_days, now)).await {
            Ok(Ok(n)) => Ok(n),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("sweep task join: {}", e)),
        };
    match &result {
        Ok(0) => tracing::debug!(operation = "sweep", "no expired partitions"),
        Ok(n) => tracing::info!(operation = "sweep", removed = n, "expired partitions removed"),
        Err(e) => tracing::warn!(error = %e, operation = "sweep", "Failed to sweep old partitions"),
    }
    result
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<WorkerStats> {
    let span = tracing::span!(
        tracing::Level::DEBUG,
        "worker",
        sample_interval_secs = config.sample_interval_secs
    );
    tokio::spawn(run(deps, config).instrument(span))
}

async fn run(deps: WorkerDeps, config: WorkerConfig) -> WorkerStats {
    let WorkerDeps {
        cycle,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_secs,
        stats_log_interval_secs,
        once,
    } = config;

    let mut tick = interval(Duration::from_secs(sample_interval_secs));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
    stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately; consume it so stats are not logged at startup.
    stats_log_tick.tick().await;

    let mut stats = WorkerStats::default();

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let report = run_once(&cycle).await;
                stats.record(&report);
                if once {
                    tracing::debug!("Single-shot cycle complete");
                    break;
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Worker shutting down");
                break;
            }
            _ = stats_log_tick.tick() => {
                tracing::info!(
                    cycles_total = stats.cycles_total,
                    append_failures = stats.append_failures,
                    sweeps_total = stats.sweeps_total,
                    sweep_failures = stats.sweep_failures,
                    partitions_swept = stats.partitions_swept,
                    degraded_probes = stats.degraded_probes,
                    "collector stats"
                );
            }
        }
    }
    stats
}
