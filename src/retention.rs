// Retention sweep: delete partitions dated before `now - max_days`.

use crate::error::SweepError;
use crate::partition_repo::{is_partition_name, parse_partition_date};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::path::Path;
use tracing::instrument;

/// Sweeps against the current wall clock. Returns the number of partitions removed.
pub fn sweep(dir: &Path, max_days: u32) -> Result<usize, SweepError> {
    sweep_at(dir, max_days, Utc::now())
}

/// A partition is removed when midnight UTC of its date is strictly before the cutoff.
pub fn cutoff(now: DateTime<Utc>, max_days: u32) -> DateTime<Utc> {
    now - TimeDelta::days(i64::from(max_days))
}

pub fn is_expired(date: NaiveDate, cutoff: DateTime<Utc>) -> bool {
    date.and_time(chrono::NaiveTime::MIN).and_utc() < cutoff
}

/// Names that match the convention but carry a bad date are skipped, never deleted.
/// A failed delete is logged and the sweep moves on; the next sweep retries it.
#[instrument(skip(dir), fields(operation = "sweep", path = %dir.display()))]
pub fn sweep_at(dir: &Path, max_days: u32, now: DateTime<Utc>) -> Result<usize, SweepError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(SweepError::ReadDir {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };
    let cutoff = cutoff(now, max_days);
    let mut removed = 0;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(date) = parse_partition_date(name) else {
            if is_partition_name(name) {
                tracing::debug!(file = name, "partition name has no valid date; skipped");
            }
            continue;
        };
        if !is_expired(date, cutoff) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::debug!(file = name, %date, "expired partition removed");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, file = name, "failed to remove expired partition");
            }
        }
    }

    Ok(removed)
}
