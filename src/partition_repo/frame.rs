// In-memory columnar frame for one partition, encoded with wincode.

use super::blob;
use crate::error::StoreError;
use crate::models::Sample;
use chrono::DateTime;
use std::path::Path;
use wincode::{SchemaRead, SchemaWrite};

/// Column names in on-disk order.
pub const COLUMNS: [&str; 8] = [
    "Timestamp",
    "CpuUsagePercent",
    "MemoryTotalBytes",
    "MemoryUsedBytes",
    "NetworkInTotalBytes",
    "NetworkOutTotalBytes",
    "StorageTotalBytes",
    "StorageUsedBytes",
];

/// One vector per column; row `i` is the `i`-th element of each.
#[derive(Debug, Clone, Default, PartialEq, SchemaRead, SchemaWrite)]
pub(super) struct Frame {
    columns: Vec<String>,
    /// Milliseconds since the Unix epoch, UTC.
    timestamp: Vec<i64>,
    cpu_usage_percent: Vec<f64>,
    memory_total_bytes: Vec<i64>,
    memory_used_bytes: Vec<i64>,
    network_in_total_bytes: Vec<i64>,
    network_out_total_bytes: Vec<i64>,
    storage_total_bytes: Vec<i64>,
    storage_used_bytes: Vec<i64>,
}

impl Frame {
    pub fn empty() -> Self {
        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    /// Appends one row at the end. All eight columns grow together.
    pub fn push(&mut self, sample: &Sample) {
        self.timestamp.push(sample.timestamp.timestamp_millis());
        self.cpu_usage_percent.push(sample.cpu_usage_percent);
        self.memory_total_bytes.push(to_i64(sample.memory_total_bytes));
        self.memory_used_bytes.push(to_i64(sample.memory_used_bytes));
        self.network_in_total_bytes
            .push(to_i64(sample.network_in_total_bytes));
        self.network_out_total_bytes
            .push(to_i64(sample.network_out_total_bytes));
        self.storage_total_bytes.push(to_i64(sample.storage_total_bytes));
        self.storage_used_bytes.push(to_i64(sample.storage_used_bytes));
    }

    pub fn rows(&self) -> Result<Vec<Sample>, StoreError> {
        (0..self.len())
            .map(|i| {
                let ms = self.timestamp[i];
                let timestamp =
                    DateTime::from_timestamp_millis(ms).ok_or(StoreError::InvalidTimestamp(ms))?;
                Ok(Sample {
                    timestamp,
                    cpu_usage_percent: self.cpu_usage_percent[i],
                    memory_total_bytes: to_u64(self.memory_total_bytes[i]),
                    memory_used_bytes: to_u64(self.memory_used_bytes[i]),
                    network_in_total_bytes: to_u64(self.network_in_total_bytes[i]),
                    network_out_total_bytes: to_u64(self.network_out_total_bytes[i]),
                    storage_total_bytes: to_u64(self.storage_total_bytes[i]),
                    storage_used_bytes: to_u64(self.storage_used_bytes[i]),
                })
            })
            .collect()
    }

    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        let payload = wincode::serialize(self).map_err(|e| StoreError::Encode(e.to_string()))?;
        Ok(blob::with_header(blob::FRAME_VERSION, payload))
    }

    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Self, StoreError> {
        let decode_err = |reason: String| StoreError::Decode {
            path: path.to_path_buf(),
            reason,
        };
        let (version, payload) =
            blob::split_header(bytes).ok_or_else(|| decode_err("missing file header".into()))?;
        if version != blob::FRAME_VERSION {
            return Err(decode_err(format!("unsupported frame version {}", version)));
        }
        let frame: Frame =
            wincode::deserialize(payload).map_err(|e| decode_err(format!("wincode: {}", e)))?;
        frame.check(path)?;
        Ok(frame)
    }

    fn check(&self, path: &Path) -> Result<(), StoreError> {
        if self.columns.len() != COLUMNS.len()
            || self.columns.iter().zip(COLUMNS.iter()).any(|(a, b)| a != b)
        {
            return Err(StoreError::Schema {
                path: path.to_path_buf(),
                found: self.columns.clone(),
            });
        }
        let n = self.len();
        let lengths = [
            self.cpu_usage_percent.len(),
            self.memory_total_bytes.len(),
            self.memory_used_bytes.len(),
            self.network_in_total_bytes.len(),
            self.network_out_total_bytes.len(),
            self.storage_total_bytes.len(),
            self.storage_used_bytes.len(),
        ];
        if lengths.iter().any(|&l| l != n) {
            return Err(StoreError::Decode {
                path: path.to_path_buf(),
                reason: format!("ragged columns: timestamp has {} rows, others {:?}", n, lengths),
            });
        }
        Ok(())
    }
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn to_u64(v: i64) -> u64 {
    u64::try_from(v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(minute: u32) -> Sample {
        Sample {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
            cpu_usage_percent: minute as f64,
            memory_total_bytes: 8,
            memory_used_bytes: 4,
            network_in_total_bytes: u64::MAX,
            network_out_total_bytes: 2,
            storage_total_bytes: 100,
            storage_used_bytes: 50,
        }
    }

    #[test]
    fn encode_decode_keeps_row_order() {
        let mut frame = Frame::empty();
        frame.push(&sample(1));
        frame.push(&sample(2));
        let bytes = frame.encode().unwrap();
        let back = Frame::decode(Path::new("p"), &bytes).unwrap();
        assert_eq!(back, frame);
        let rows = back.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp_display(), "2024-01-01T00:01:00Z");
        assert_eq!(rows[1].cpu_usage_percent, 2.0);
        // Counters above i64::MAX saturate.
        assert_eq!(rows[0].network_in_total_bytes, i64::MAX as u64);
    }

    #[test]
    fn decode_rejects_foreign_schema() {
        let mut frame = Frame::empty();
        frame.columns[1] = "Cpu".into();
        let bytes = frame.encode().unwrap();
        let err = Frame::decode(Path::new("p"), &bytes).unwrap_err();
        assert!(matches!(err, StoreError::Schema { .. }));
    }

    #[test]
    fn decode_rejects_ragged_columns() {
        let mut frame = Frame::empty();
        frame.push(&sample(1));
        frame.storage_used_bytes.pop();
        let bytes = frame.encode().unwrap();
        let err = Frame::decode(Path::new("p"), &bytes).unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[test]
    fn decode_rejects_unknown_version_and_garbage() {
        let bytes = blob::with_header(9, vec![]);
        assert!(Frame::decode(Path::new("p"), &bytes).is_err());
        assert!(Frame::decode(Path::new("p"), b"not a frame").is_err());
    }
}
