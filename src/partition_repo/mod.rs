// Date-partitioned sample store. One file per UTC day, rewritten whole on every append.
//
// Append is read-merge-write: O(partition size) per call, fine at one row per minute
// (<= 1440 rows per file). It assumes a single writer per directory; two collectors
// sharing an output directory can lose rows.

mod blob;
mod frame;
mod naming;

pub use frame::COLUMNS;
pub use naming::{
    PARTITION_EXTENSION, PARTITION_PREFIX, is_partition_name, parse_partition_date,
    partition_file_name, partition_path,
};

use crate::error::StoreError;
use crate::models::Sample;
use chrono::NaiveDate;
use frame::Frame;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub struct PartitionRepo {
    dir: PathBuf,
}

impl PartitionRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends `sample` as the last row of its day's partition. Returns the partition path.
    #[instrument(skip(self, sample), fields(repo = "partition", operation = "append", timestamp = %sample.timestamp_display()))]
    pub fn append(&self, sample: &Sample) -> Result<PathBuf, StoreError> {
        let path = partition_path(&self.dir, sample.timestamp);
        let mut frame = load_frame(&path)?.unwrap_or_else(Frame::empty);
        frame.push(sample);
        write_atomic(&path, &frame.encode()?)?;
        tracing::debug!(path = %path.display(), rows = frame.len(), "partition rewritten");
        Ok(path)
    }

    /// All rows of one day, in insertion order. Empty when the partition does not exist.
    #[instrument(skip(self), fields(repo = "partition", operation = "read_partition"))]
    pub fn read_partition(&self, date: NaiveDate) -> Result<Vec<Sample>, StoreError> {
        let path = self.dir.join(partition_file_name(date));
        match load_frame(&path)? {
            Some(frame) => frame.rows(),
            None => Ok(Vec::new()),
        }
    }

    /// Partitions with a valid embedded date, oldest first. Other files are ignored.
    #[instrument(skip(self), fields(repo = "partition", operation = "list_partitions"))]
    pub fn list_partitions(&self) -> Result<Vec<(NaiveDate, PathBuf)>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let name = entry.file_name();
            if let Some(date) = name.to_str().and_then(parse_partition_date) {
                out.push((date, entry.path()));
            }
        }
        out.sort();
        Ok(out)
    }
}

/// Free-function form of [`PartitionRepo::append`].
pub fn append(dir: &Path, sample: &Sample) -> Result<(), StoreError> {
    PartitionRepo::new(dir).append(sample).map(|_| ())
}

fn load_frame(path: &Path) -> Result<Option<Frame>, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    Frame::decode(path, &bytes).map(Some)
}

/// Writes to a hidden temp file next to `path`, syncs it, then renames over `path`.
/// Readers see either the old file or the new one, never a partial write.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let write = || -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()
    };
    if let Err(e) = write() {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StoreError::io(&temp_path, e));
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StoreError::io(path, e));
    }

    // Persist the rename itself; not every platform allows syncing a directory.
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}
