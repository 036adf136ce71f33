use anyhow::Result;
use clap::Parser;
use hostmetrics::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load(cli.config.as_deref())?.with_cli_overrides(&cli)?;
    let sweep_schedule = app_config.sweep_schedule()?;

    let output_dir = std::path::PathBuf::from(&app_config.collector.output_dir);
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| anyhow::anyhow!("create {}: {}", output_dir.display(), e))?;

    let source = metric_source::select_source(&app_config.probes);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        source = source.name(),
        output_dir = %output_dir.display(),
        retention_days = app_config.collector.retention_days,
        once = cli.once,
        "Collecting host metrics"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let mut worker_handle = worker::spawn(
        worker::WorkerDeps {
            cycle: worker::CycleDeps {
                source,
                repo: Arc::new(partition_repo::PartitionRepo::new(output_dir)),
                retention_days: app_config.collector.retention_days,
                sweep_schedule,
            },
            shutdown_rx,
        },
        worker::WorkerConfig {
            sample_interval_secs: app_config.collector.sample_interval_secs,
            stats_log_interval_secs: app_config.collector.stats_log_interval_secs,
            once: cli.once,
        },
    );

    tokio::select! {
        result = &mut worker_handle => {
            let stats = result?;
            tracing::debug!(?stats, "Worker finished");
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let stats = worker_handle.await?;
            tracing::info!(?stats, "Worker stopped");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
