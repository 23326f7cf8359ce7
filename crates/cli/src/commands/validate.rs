//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::DetectorConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    station: String,
    detection_threshold: usize,
    detector_mode: String,
    sample_shape: (usize, usize),
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(manifest) => {
            let warnings = collect_warnings(&manifest);
            let detector_mode = match manifest.segmenter.detector {
                DetectorConfig::SingleBeam { .. } => "single_beam".to_string(),
                DetectorConfig::Scanning { .. } => "scanning".to_string(),
            };

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", manifest.version),
                    station: manifest.station.id.clone(),
                    detection_threshold: manifest.segmenter.detection_threshold,
                    detector_mode,
                    sample_shape: (manifest.normalizer.rows, manifest.normalizer.cols),
                    sink_count: manifest.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(manifest: &contracts::PipelineManifest) -> Vec<String> {
    let mut warnings = Vec::new();

    if manifest.sinks.is_empty() {
        warnings.push("No sinks configured - extracted samples will be dropped".to_string());
    }

    if manifest.ingest.settle_secs == 0 {
        warnings.push(
            "ingest.settle_secs is 0 - files still being written may be picked up".to_string(),
        );
    }

    if let DetectorConfig::SingleBeam { .. } = manifest.segmenter.detector {
        if manifest.normalizer.cols > 1 {
            warnings.push(format!(
                "normalizer.cols is {} but the single-beam detector implies width-1 rows; \
                 extra columns will be zero-padded",
                manifest.normalizer.cols
            ));
        }
    }

    if let DetectorConfig::Scanning { min_beams, .. } = manifest.segmenter.detector {
        if min_beams > manifest.telegram.data_points() {
            warnings.push(format!(
                "segmenter.detector.min_beams ({}) exceeds telegram data points ({}) - \
                 no frame can ever read occupied",
                min_beams,
                manifest.telegram.data_points()
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("OK  Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Station: {}", summary.station);
            println!("  Detection threshold: {}", summary.detection_threshold);
            println!("  Detector mode: {}", summary.detector_mode);
            println!(
                "  Sample shape: {}x{}",
                summary.sample_shape.0, summary.sample_shape.1
            );
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\nWarnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("ERR Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
