//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// lidar-harvest - Roadside lidar vehicle extraction pipeline
#[derive(Parser, Debug)]
#[command(
    name = "lidar-harvest",
    author,
    version,
    about = "Roadside lidar vehicle extraction pipeline",
    long_about = "Compresses raw lidar telegram logs into timestamped archival blocks, \n\
                  then scans archived blocks for vehicle transits, normalizes each \n\
                  detected span into a fixed-shape sample, and dispatches samples \n\
                  to configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LIDAR_HARVEST_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LIDAR_HARVEST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress raw telegram logs into archival blocks
    Compress(CompressArgs),

    /// Extract vehicle samples from archival blocks
    Extract(ExtractArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `compress` command
#[derive(Parser, Debug, Clone)]
pub struct CompressArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "manifest.toml",
        env = "LIDAR_HARVEST_CONFIG"
    )]
    pub config: PathBuf,

    /// Override raw log directory from configuration
    #[arg(long, env = "LIDAR_HARVEST_RAW_DIR")]
    pub raw_dir: Option<PathBuf>,

    /// Override archive directory from configuration
    #[arg(long, env = "LIDAR_HARVEST_ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Keep watching the raw directory instead of exiting after one pass
    #[arg(long)]
    pub watch: bool,

    /// Seconds between watch passes
    #[arg(long, default_value = "600", env = "LIDAR_HARVEST_WATCH_INTERVAL")]
    pub interval_secs: u64,

    /// Maximum number of blocks to write in watch mode (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_blocks: u64,

    /// Files buffered between the reader and the block builder
    #[arg(long, default_value = "16", env = "LIDAR_HARVEST_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LIDAR_HARVEST_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `extract` command
#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "manifest.toml",
        env = "LIDAR_HARVEST_CONFIG"
    )]
    pub config: PathBuf,

    /// Override archive directory from configuration
    #[arg(long, env = "LIDAR_HARVEST_ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Maximum number of blocks to process (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_blocks: u64,

    /// Channel buffer size for the dispatcher queue
    #[arg(long, default_value = "100", env = "LIDAR_HARVEST_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LIDAR_HARVEST_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "manifest.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "manifest.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show telegram grammar details
    #[arg(long)]
    pub telegram: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
