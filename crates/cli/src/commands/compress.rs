//! `compress` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::cli::CompressArgs;
use crate::pipeline::{CompressStage, CompressStats};

/// Execute the `compress` command
pub async fn run_compress(args: &CompressArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut manifest = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref raw_dir) = args.raw_dir {
        info!(raw_dir = %raw_dir.display(), "Overriding raw directory from CLI");
        manifest.ingest.raw_dir = raw_dir.clone();
    }
    if let Some(ref archive_dir) = args.archive_dir {
        info!(archive_dir = %archive_dir.display(), "Overriding archive directory from CLI");
        manifest.ingest.archive_dir = archive_dir.clone();
    }

    info!(
        station = %manifest.station.id,
        raw_dir = %manifest.ingest.raw_dir.display(),
        archive_dir = %manifest.ingest.archive_dir.display(),
        settle_secs = manifest.ingest.settle_secs,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let mut stage = CompressStage::new(manifest, args.buffer_size)?;

    if args.watch {
        run_watch(args, &mut stage).await?;
    } else {
        match stage.run_once().await? {
            Some(stats) => stats.print_summary(),
            None => info!("Nothing to compress"),
        }
    }

    info!("Compression finished");
    Ok(())
}

/// Interval-driven watch loop with graceful shutdown
async fn run_watch(args: &CompressArgs, stage: &mut CompressStage) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = setup_shutdown_signal();
    tokio::pin!(shutdown);

    info!(
        interval_secs = args.interval_secs,
        max_blocks = args.max_blocks,
        "Watching raw directory"
    );

    let mut total = CompressStats::default();
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(stats) = stage.run_once().await? {
                    total.merge(&stats);
                }
                if args.max_blocks > 0 && total.blocks_written >= args.max_blocks {
                    info!(blocks = total.blocks_written, "Reached max blocks limit");
                    break;
                }
            }
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping watch loop...");
                break;
            }
        }
    }

    total.print_summary();
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
