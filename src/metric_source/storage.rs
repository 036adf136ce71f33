// Storage probe for one configured path, via statvfs on that path.

use crate::models::StorageReading;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub struct StorageProbe {
    path: PathBuf,
}

impl StorageProbe {
    /// `path` may be any file or directory on the filesystem to report, relative or absolute.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> anyhow::Result<StorageReading> {
        let (total, available) = filesystem_space(&self.path)
            .with_context(|| format!("statvfs {}", self.path.display()))?;
        Ok(StorageReading::from_total_and_available(total, available))
    }
}

#[cfg(unix)]
fn filesystem_space(path: &Path) -> anyhow::Result<(u64, u64)> {
    let st = rustix::fs::statvfs(path)?;
    Ok(space_from_blocks(st.f_blocks, st.f_bavail, st.f_frsize))
}

#[cfg(not(unix))]
fn filesystem_space(_path: &Path) -> anyhow::Result<(u64, u64)> {
    anyhow::bail!("filesystem statistics are not available on this platform")
}

/// `(total, available)` in bytes. Block counts are in units of the fragment size.
pub(super) fn space_from_blocks(
    blocks: u64,
    available_blocks: u64,
    fragment_size: u64,
) -> (u64, u64) {
    (
        blocks.saturating_mul(fragment_size),
        available_blocks.saturating_mul(fragment_size),
    )
}
