// macOS probes: top, sysctl and vm_stat output parsing. Network and storage are shared with Linux.

use super::{MetricSource, StorageProbe, absorb, network};
use crate::models::{CpuReading, MemoryReading, NetworkReading, Probe, StorageReading};
use anyhow::Context;
use std::process::Command;
use tracing::instrument;

/// Used when the vm_stat header carries no page size.
const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Runs an external command and returns its stdout.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<String>;
}

/// Spawns the real binaries from `PATH`.
pub struct SystemCommands;

impl CommandRunner for SystemCommands {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("spawn {}", program))?;
        anyhow::ensure!(
            output.status.success(),
            "{} exited with {}",
            program,
            output.status
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub struct DarwinSource {
    storage: StorageProbe,
    commands: Box<dyn CommandRunner>,
}

impl DarwinSource {
    pub fn new(storage: StorageProbe) -> Self {
        Self::with_commands(storage, SystemCommands)
    }

    pub fn with_commands(storage: StorageProbe, commands: impl CommandRunner + 'static) -> Self {
        Self {
            storage,
            commands: Box::new(commands),
        }
    }

    fn read_cpu(&self) -> anyhow::Result<CpuReading> {
        let output = self.commands.run("top", &["-l", "1", "-n", "0"])?;
        let usage_percent = parse_top_cpu(&output).context("no CPU usage line in top output")?;
        Ok(CpuReading { usage_percent })
    }

    fn read_memory(&self) -> anyhow::Result<MemoryReading> {
        let total = self
            .commands
            .run("sysctl", &["-n", "hw.memsize"])?
            .trim()
            .parse::<u64>()
            .context("parse hw.memsize")?;
        let vm_stat = self.commands.run("vm_stat", &[])?;
        let (page_size, free_pages) =
            parse_vm_stat(&vm_stat).context("no free page count in vm_stat output")?;
        Ok(MemoryReading {
            total_bytes: total,
            used_bytes: total.saturating_sub(free_pages.saturating_mul(page_size)),
        })
    }
}

impl MetricSource for DarwinSource {
    fn name(&self) -> &'static str {
        "darwin"
    }

    #[instrument(skip(self), fields(source = "darwin", operation = "cpu"))]
    fn cpu(&self) -> Probe<CpuReading> {
        absorb("darwin", "cpu", self.read_cpu())
    }

    #[instrument(skip(self), fields(source = "darwin", operation = "memory"))]
    fn memory(&self) -> Probe<MemoryReading> {
        absorb("darwin", "memory", self.read_memory())
    }

    #[instrument(skip(self), fields(source = "darwin", operation = "network"))]
    fn network(&self) -> Probe<NetworkReading> {
        absorb("darwin", "network", network::read())
    }

    #[instrument(skip(self), fields(source = "darwin", operation = "storage"))]
    fn storage(&self) -> Probe<StorageReading> {
        absorb("darwin", "storage", self.storage.read())
    }
}

/// `CPU usage: 10.55% user, 8.24% sys, 81.20% idle` -> user + sys.
pub(super) fn parse_top_cpu(output: &str) -> Option<f64> {
    let line = output.lines().find(|l| l.contains("CPU usage:"))?;
    let (_, rest) = line.split_once("CPU usage:")?;
    let mut busy = None;
    for part in rest.split(',') {
        let mut tokens = part.split_whitespace();
        let (Some(value), Some(label)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if label != "user" && label != "sys" {
            continue;
        }
        let value: f64 = value.trim_end_matches('%').parse().ok()?;
        busy = Some(busy.unwrap_or(0.0) + value);
    }
    busy
}

/// Returns `(page_size, free_pages)`.
pub(super) fn parse_vm_stat(output: &str) -> Option<(u64, u64)> {
    let page_size = output
        .lines()
        .next()
        .and_then(|header| header.split_once("page size of "))
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let free_pages = output
        .lines()
        .find(|l| l.starts_with("Pages free:"))?
        .split_whitespace()
        .last()?
        .trim_end_matches('.')
        .parse::<u64>()
        .ok()?;
    Some((page_size, free_pages))
}
