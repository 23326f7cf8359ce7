//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::DetectorConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    station: StationInfo,
    ingest: IngestInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    telegram: Option<TelegramInfo>,
    segmenter: SegmenterInfo,
    normalizer: NormalizerInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct StationInfo {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize)]
struct IngestInfo {
    raw_dir: String,
    archive_dir: String,
    file_stem: String,
    settle_secs: u64,
    delete_consumed: bool,
}

#[derive(Serialize)]
struct TelegramInfo {
    expected_fields: usize,
    header_fields: usize,
    trailer_fields: usize,
    data_points: usize,
}

#[derive(Serialize)]
struct SegmenterInfo {
    detection_threshold: usize,
    detector: String,
}

#[derive(Serialize)]
struct NormalizerInfo {
    rows: usize,
    cols: usize,
    full_scale: u32,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let manifest = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&manifest, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&manifest, args);
    }

    Ok(())
}

fn describe_detector(detector: &DetectorConfig) -> String {
    match *detector {
        DetectorConfig::SingleBeam { range_threshold } => {
            format!("single_beam (range < {range_threshold})")
        }
        DetectorConfig::Scanning {
            range_threshold,
            min_beams,
        } => format!("scanning (>= {min_beams} beams with range < {range_threshold})"),
    }
}

fn build_config_info(manifest: &contracts::PipelineManifest, args: &InfoArgs) -> ConfigInfo {
    let telegram = if args.telegram {
        Some(TelegramInfo {
            expected_fields: manifest.telegram.expected_fields,
            header_fields: manifest.telegram.header_fields,
            trailer_fields: manifest.telegram.trailer_fields,
            data_points: manifest.telegram.data_points(),
        })
    } else {
        None
    };

    let sinks = if args.sinks {
        manifest
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", manifest.version),
        station: StationInfo {
            id: manifest.station.id.clone(),
            description: manifest.station.description.clone(),
        },
        ingest: IngestInfo {
            raw_dir: manifest.ingest.raw_dir.display().to_string(),
            archive_dir: manifest.ingest.archive_dir.display().to_string(),
            file_stem: manifest.ingest.file_stem.clone(),
            settle_secs: manifest.ingest.settle_secs,
            delete_consumed: manifest.ingest.delete_consumed,
        },
        telegram,
        segmenter: SegmenterInfo {
            detection_threshold: manifest.segmenter.detection_threshold,
            detector: describe_detector(&manifest.segmenter.detector),
        },
        normalizer: NormalizerInfo {
            rows: manifest.normalizer.rows,
            cols: manifest.normalizer.cols,
            full_scale: manifest.normalizer.full_scale,
        },
        sinks,
    }
}

fn print_config_info(manifest: &contracts::PipelineManifest, args: &InfoArgs) {
    println!("=== lidar-harvest Configuration ===\n");

    println!("Station");
    println!("   Version: {:?}", manifest.version);
    println!("   Id: {}", manifest.station.id);
    if let Some(ref description) = manifest.station.description {
        println!("   Description: {}", description);
    }

    println!("\nIngest");
    println!("   Raw directory: {}", manifest.ingest.raw_dir.display());
    println!(
        "   Archive directory: {}",
        manifest.ingest.archive_dir.display()
    );
    println!("   File stem: {}", manifest.ingest.file_stem);
    println!("   Settle window: {}s", manifest.ingest.settle_secs);
    println!("   Delete consumed: {}", manifest.ingest.delete_consumed);

    if args.telegram {
        let t = &manifest.telegram;
        println!("\nTelegram grammar");
        println!("   Fields: {}", t.expected_fields);
        println!(
            "   Layout: {} header + {} data + {} trailer",
            t.header_fields,
            t.data_points(),
            t.trailer_fields
        );
    }

    println!("\nSegmenter");
    println!(
        "   Detection threshold: {} frames",
        manifest.segmenter.detection_threshold
    );
    println!(
        "   Detector: {}",
        describe_detector(&manifest.segmenter.detector)
    );

    println!("\nNormalizer");
    println!(
        "   Sample shape: {}x{}",
        manifest.normalizer.rows, manifest.normalizer.cols
    );
    println!("   Full scale: {}", manifest.normalizer.full_scale);

    if args.sinks && !manifest.sinks.is_empty() {
        println!("\nSinks ({})", manifest.sinks.len());
        for sink in &manifest.sinks {
            println!(
                "   - {} ({:?}, queue {})",
                sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    } else {
        println!("\nSinks: {}", manifest.sinks.len());
    }

    println!();
}
