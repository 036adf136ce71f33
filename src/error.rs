// Typed errors for the store and the retention sweeper.

use std::path::PathBuf;

/// Failure while appending to or reading a partition.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("partition io {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encode partition frame: {0}")]
    Encode(String),
    #[error("decode partition {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("partition {path} has unexpected columns {found:?}")]
    Schema { path: PathBuf, found: Vec<String> },
    #[error("timestamp {0} ms is out of range")]
    InvalidTimestamp(i64),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure while listing partitions for retention.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("list partitions in {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
