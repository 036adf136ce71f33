// Partition file naming: metrics_<YYYY-MM-DD>.mcol, keyed by UTC calendar date.

use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};

pub const PARTITION_PREFIX: &str = "metrics_";
pub const PARTITION_EXTENSION: &str = "mcol";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn partition_file_name(date: NaiveDate) -> String {
    format!(
        "{}{}.{}",
        PARTITION_PREFIX,
        date.format(DATE_FORMAT),
        PARTITION_EXTENSION
    )
}

/// Every timestamp on the same UTC date maps to the same path.
pub fn partition_path(dir: &Path, timestamp: DateTime<Utc>) -> PathBuf {
    dir.join(partition_file_name(timestamp.date_naive()))
}

/// Does the name look like a partition (prefix and extension), whatever the date part holds?
pub fn is_partition_name(file_name: &str) -> bool {
    date_part(file_name).is_some()
}

/// Date embedded in a partition file name. `None` for other files or bad dates.
pub fn parse_partition_date(file_name: &str) -> Option<NaiveDate> {
    let date = date_part(file_name)?;
    // %Y accepts signs and short years; require the exact YYYY-MM-DD shape.
    if date.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

fn date_part(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(PARTITION_PREFIX)?
        .strip_suffix(PARTITION_EXTENSION)?
        .strip_suffix('.')
}
