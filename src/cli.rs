// Command-line surface. Unset flags fall back to the config file, then defaults.

use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hostmetrics",
    version,
    about = "Collect host metrics into daily partition files"
)]
pub struct Cli {
    /// Directory for partition files [default: ./host_metrics]
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Collect a single sample and exit
    #[arg(long)]
    pub once: bool,

    /// Partitions older than this many days are deleted [default: 365]
    #[arg(long)]
    pub max_days: Option<u32>,

    /// TOML config file (also read from CONFIG_FILE)
    #[arg(long)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
