// Worker tests: cycle ordering, failure isolation, single-shot and shutdown

mod common;

use chrono::NaiveDate;
use common::{FixedSource, utc};
use hostmetrics::metric_source::{MetricSource, UnsupportedSource};
use hostmetrics::partition_repo::{PartitionRepo, partition_file_name};
use hostmetrics::worker::{self, CycleDeps, WorkerConfig, WorkerDeps, WorkerStats};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

fn hourly() -> cron::Schedule {
    cron::Schedule::from_str("0 0 * * * *").unwrap()
}

fn deps(dir: &Path, source: Arc<dyn MetricSource>, retention_days: u32) -> CycleDeps {
    CycleDeps {
        source,
        repo: Arc::new(PartitionRepo::new(dir)),
        retention_days,
        sweep_schedule: hourly(),
    }
}

fn touch_partition(dir: &Path, y: i32, m: u32, d: u32) -> std::path::PathBuf {
    let path = dir.join(partition_file_name(NaiveDate::from_ymd_opt(y, m, d).unwrap()));
    std::fs::write(&path, b"rows").unwrap();
    path
}

#[tokio::test]
async fn cycle_appends_truncated_sample_without_sweep_off_the_hour() {
    let dir = TempDir::new().unwrap();
    let deps = deps(dir.path(), Arc::new(FixedSource::default()), 30);
    let old = touch_partition(dir.path(), 2020, 1, 1);

    let report = worker::run_cycle(&deps, utc(2024, 1, 1, 0, 1, 42)).await;

    assert!(report.appended());
    assert!(report.sweep.is_none());
    assert!(report.degraded.is_empty());
    assert!(old.exists());
    assert_eq!(report.sample.timestamp_display(), "2024-01-01T00:01:00Z");

    let rows = deps
        .repo
        .read_partition(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .unwrap();
    assert_eq!(rows, vec![report.sample.clone()]);
    assert_eq!(rows[0].cpu_usage_percent, 25.0);
    assert_eq!(rows[0].network_out_total_bytes, 2_000);
}

#[tokio::test]
async fn cycle_at_top_of_hour_sweeps() {
    let dir = TempDir::new().unwrap();
    let deps = deps(dir.path(), Arc::new(FixedSource::default()), 30);
    let old = touch_partition(dir.path(), 2024, 1, 15);
    let kept = touch_partition(dir.path(), 2024, 2, 15);

    let report = worker::run_cycle(&deps, utc(2024, 3, 1, 14, 0, 5)).await;

    assert!(report.appended());
    assert_eq!(report.sweep, Some(Ok(1)));
    assert!(!old.exists());
    assert!(kept.exists());
}

#[tokio::test]
async fn append_failure_does_not_block_sweep() {
    let dir = TempDir::new().unwrap();
    let deps = deps(dir.path(), Arc::new(FixedSource::default()), 30);
    let today = dir.path().join("metrics_2024-03-01.mcol");
    std::fs::write(&today, b"corrupt").unwrap();
    let old = touch_partition(dir.path(), 2023, 12, 1);

    let report = worker::run_cycle(&deps, utc(2024, 3, 1, 0, 0, 0)).await;

    assert!(!report.appended());
    assert!(report.append.as_ref().unwrap_err().contains("metrics_2024-03-01.mcol"));
    assert_eq!(report.sweep, Some(Ok(1)));
    assert!(!old.exists());
    assert_eq!(std::fs::read(&today).unwrap(), b"corrupt");

    let mut stats = WorkerStats::default();
    stats.record(&report);
    assert_eq!(stats.append_failures, 1);
    assert_eq!(stats.partitions_swept, 1);
}

#[tokio::test]
async fn unreadable_output_dir_counts_sweep_failure() {
    let dir = TempDir::new().unwrap();
    let not_a_dir = dir.path().join("plain-file");
    std::fs::write(&not_a_dir, b"x").unwrap();
    let deps = deps(&not_a_dir, Arc::new(FixedSource::default()), 30);

    let report = worker::run_cycle(&deps, utc(2024, 3, 1, 5, 0, 0)).await;

    assert!(!report.appended());
    assert!(report.sweep.as_ref().unwrap().as_ref().unwrap_err().contains("plain-file"));

    let mut stats = WorkerStats::default();
    stats.record(&report);
    assert_eq!(stats.sweeps_total, 1);
    assert_eq!(stats.sweep_failures, 1);
    assert_eq!(stats.partitions_swept, 0);
}

#[tokio::test]
async fn unsupported_platform_still_persists_zero_sample() {
    let dir = TempDir::new().unwrap();
    let deps = deps(dir.path(), Arc::new(UnsupportedSource), 30);

    let report = worker::run_cycle(&deps, utc(2024, 1, 1, 0, 1, 0)).await;

    assert!(report.appended());
    assert_eq!(report.degraded, vec!["cpu", "memory", "network", "storage"]);
    assert_eq!(report.sample.cpu_usage_percent, 0.0);
    assert_eq!(report.sample.storage_total_bytes, 0);
}

#[tokio::test]
async fn single_shot_runs_exactly_one_cycle() {
    let dir = TempDir::new().unwrap();
    let (_shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = worker::spawn(
        WorkerDeps {
            cycle: deps(dir.path(), Arc::new(FixedSource::default()), 30),
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_secs: 1,
            stats_log_interval_secs: 3600,
            once: true,
        },
    );

    let stats = handle.await.unwrap();
    assert_eq!(stats.cycles_total, 1);
    assert_eq!(stats.append_failures, 0);

    let partitions = PartitionRepo::new(dir.path()).list_partitions().unwrap();
    assert_eq!(partitions.len(), 1);
}

#[tokio::test]
async fn single_shot_with_unwritable_output_still_completes() {
    let dir = TempDir::new().unwrap();
    let (_shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = worker::spawn(
        WorkerDeps {
            cycle: deps(
                &dir.path().join("missing"),
                Arc::new(FixedSource::default()),
                30,
            ),
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_secs: 1,
            stats_log_interval_secs: 3600,
            once: true,
        },
    );

    let stats = handle.await.unwrap();
    assert_eq!(stats.cycles_total, 1);
    assert_eq!(stats.append_failures, 1);
}

#[tokio::test]
async fn continuous_worker_stops_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = worker::spawn(
        WorkerDeps {
            cycle: deps(dir.path(), Arc::new(FixedSource::default()), 30),
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_secs: 3600,
            stats_log_interval_secs: 3600,
            once: false,
        },
    );

    // The first tick fires immediately; wait for its partition to land.
    let repo = PartitionRepo::new(dir.path());
    for _ in 0..100 {
        if !repo.list_partitions().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }
    let _ = shutdown_tx.send(());

    let stats = handle.await.unwrap();
    assert_eq!(stats.cycles_total, 1);
    assert_eq!(repo.list_partitions().unwrap().len(), 1);
}
