//! `extract` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::pipeline::ExtractStage;

/// Execute the `extract` command
pub async fn run_extract(args: &ExtractArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut manifest = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref archive_dir) = args.archive_dir {
        info!(archive_dir = %archive_dir.display(), "Overriding archive directory from CLI");
        manifest.ingest.archive_dir = archive_dir.clone();
    }

    info!(
        station = %manifest.station.id,
        archive_dir = %manifest.ingest.archive_dir.display(),
        detection_threshold = manifest.segmenter.detection_threshold,
        sinks = manifest.sinks.len(),
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

    let max_blocks = if args.max_blocks == 0 {
        None
    } else {
        Some(args.max_blocks)
    };

    let stage = ExtractStage::new(manifest, args.buffer_size, max_blocks);
    let stats = stage.run().await.context("Extraction failed")?;

    stats.print_summary();
    info!("Extraction finished");
    Ok(())
}
