use serde::Deserialize;
use std::str::FromStr;

use crate::cli::Cli;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub collector: CollectorConfig,
    pub probes: ProbesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Directory holding the daily partitions.
    pub output_dir: String,
    /// Partitions dated more than this many days before now are deleted.
    /// Zero keeps nothing older than the current instant.
    pub retention_days: u32,
    pub sample_interval_secs: u64,
    /// Cron expression (with seconds field) matched against each cycle's minute.
    pub sweep_schedule: String,
    /// How often to log collector stats at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            output_dir: "./host_metrics".into(),
            retention_days: 365,
            sample_interval_secs: 60,
            sweep_schedule: "0 0 * * * *".into(),
            stats_log_interval_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbesConfig {
    /// Filesystem reported by the storage probe.
    pub storage_mount: String,
    /// Gap between the two /proc/stat reads of the CPU probe.
    pub cpu_sample_window_ms: u64,
}

impl Default for ProbesConfig {
    fn default() -> Self {
        Self {
            storage_mount: "/".into(),
            cpu_sample_window_ms: 500,
        }
    }
}

impl AppConfig {
    /// Loads `path` (or `CONFIG_FILE`) when given, otherwise starts from defaults.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let path = path
            .map(str::to_owned)
            .or_else(|| std::env::var("CONFIG_FILE").ok());
        match path {
            Some(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("config {}: {}", path, e))?;
                Self::load_from_str(&s)
            }
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Command-line flags win over the file and defaults.
    pub fn with_cli_overrides(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(dir) = &cli.output_dir {
            self.collector.output_dir = dir.clone();
        }
        if let Some(days) = cli.max_days {
            self.collector.retention_days = days;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn sweep_schedule(&self) -> anyhow::Result<cron::Schedule> {
        cron::Schedule::from_str(&self.collector.sweep_schedule).map_err(|e| {
            anyhow::anyhow!(
                "collector.sweep_schedule {:?} is not a valid cron expression: {}",
                self.collector.sweep_schedule,
                e
            )
        })
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.collector.output_dir.is_empty(),
            "collector.output_dir must be non-empty"
        );
        anyhow::ensure!(
            self.collector.sample_interval_secs > 0,
            "collector.sample_interval_secs must be > 0, got {}",
            self.collector.sample_interval_secs
        );
        anyhow::ensure!(
            self.collector.stats_log_interval_secs > 0,
            "collector.stats_log_interval_secs must be > 0, got {}",
            self.collector.stats_log_interval_secs
        );
        anyhow::ensure!(
            !self.probes.storage_mount.is_empty(),
            "probes.storage_mount must be non-empty"
        );
        anyhow::ensure!(
            self.probes.cpu_sample_window_ms > 0,
            "probes.cpu_sample_window_ms must be > 0, got {}",
            self.probes.cpu_sample_window_ms
        );
        anyhow::ensure!(
            self.probes.cpu_sample_window_ms < self.collector.sample_interval_secs * 1000,
            "probes.cpu_sample_window_ms ({}) must be shorter than collector.sample_interval_secs ({}s)",
            self.probes.cpu_sample_window_ms,
            self.collector.sample_interval_secs
        );
        self.sweep_schedule()?;
        Ok(())
    }
}
