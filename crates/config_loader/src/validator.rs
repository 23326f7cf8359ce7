//! Configuration validation
//!
//! Rules:
//! - station.id non-empty
//! - ingest directories non-empty and distinct
//! - telegram field layout leaves at least one data point
//! - detection_threshold >= 1
//! - detector thresholds positive
//! - normalizer shape and full_scale positive
//! - sink names non-empty and unique, required params present

use std::collections::HashSet;

use contracts::{DetectorConfig, HarvestError, PipelineManifest, SinkType};

/// Validate a PipelineManifest
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(manifest: &PipelineManifest) -> Result<(), HarvestError> {
    validate_station(manifest)?;
    validate_ingest(manifest)?;
    validate_telegram(manifest)?;
    validate_segmenter(manifest)?;
    validate_normalizer(manifest)?;
    validate_sinks(manifest)?;
    Ok(())
}

fn validate_station(manifest: &PipelineManifest) -> Result<(), HarvestError> {
    if manifest.station.id.trim().is_empty() {
        return Err(HarvestError::config_validation(
            "station.id",
            "station id cannot be empty",
        ));
    }
    Ok(())
}

fn validate_ingest(manifest: &PipelineManifest) -> Result<(), HarvestError> {
    let ingest = &manifest.ingest;

    if ingest.raw_dir.as_os_str().is_empty() {
        return Err(HarvestError::config_validation(
            "ingest.raw_dir",
            "raw_dir cannot be empty",
        ));
    }
    if ingest.archive_dir.as_os_str().is_empty() {
        return Err(HarvestError::config_validation(
            "ingest.archive_dir",
            "archive_dir cannot be empty",
        ));
    }
    if ingest.raw_dir == ingest.archive_dir {
        return Err(HarvestError::config_validation(
            "ingest.archive_dir",
            "archive_dir must differ from raw_dir",
        ));
    }
    if ingest.file_stem.trim().is_empty() {
        return Err(HarvestError::config_validation(
            "ingest.file_stem",
            "file_stem cannot be empty",
        ));
    }
    Ok(())
}

fn validate_telegram(manifest: &PipelineManifest) -> Result<(), HarvestError> {
    let telegram = &manifest.telegram;
    let overhead = telegram.header_fields + telegram.trailer_fields;

    if telegram.expected_fields <= overhead {
        return Err(HarvestError::config_validation(
            "telegram.expected_fields",
            format!(
                "expected_fields ({}) must exceed header_fields + trailer_fields ({})",
                telegram.expected_fields, overhead
            ),
        ));
    }
    Ok(())
}

fn validate_segmenter(manifest: &PipelineManifest) -> Result<(), HarvestError> {
    let segmenter = &manifest.segmenter;

    if segmenter.detection_threshold == 0 {
        return Err(HarvestError::config_validation(
            "segmenter.detection_threshold",
            "detection_threshold must be >= 1",
        ));
    }

    match segmenter.detector {
        DetectorConfig::SingleBeam { range_threshold } => {
            if range_threshold == 0 {
                return Err(HarvestError::config_validation(
                    "segmenter.detector.range_threshold",
                    "range_threshold must be > 0",
                ));
            }
        }
        DetectorConfig::Scanning {
            range_threshold,
            min_beams,
        } => {
            if range_threshold == 0 {
                return Err(HarvestError::config_validation(
                    "segmenter.detector.range_threshold",
                    "range_threshold must be > 0",
                ));
            }
            if min_beams == 0 {
                return Err(HarvestError::config_validation(
                    "segmenter.detector.min_beams",
                    "min_beams must be >= 1",
                ));
            }
        }
    }
    Ok(())
}

fn validate_normalizer(manifest: &PipelineManifest) -> Result<(), HarvestError> {
    let normalizer = &manifest.normalizer;

    if normalizer.rows == 0 {
        return Err(HarvestError::config_validation(
            "normalizer.rows",
            "rows must be >= 1",
        ));
    }
    if normalizer.cols == 0 {
        return Err(HarvestError::config_validation(
            "normalizer.cols",
            "cols must be >= 1",
        ));
    }
    if normalizer.full_scale == 0 {
        return Err(HarvestError::config_validation(
            "normalizer.full_scale",
            "full_scale must be > 0",
        ));
    }
    Ok(())
}

fn validate_sinks(manifest: &PipelineManifest) -> Result<(), HarvestError> {
    let mut seen = HashSet::new();

    for (idx, sink) in manifest.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(HarvestError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(HarvestError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(HarvestError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be >= 1",
            ));
        }
        if sink.sink_type == SinkType::Network && !sink.params.contains_key("addr") {
            return Err(HarvestError::config_validation(
                format!("sinks[{}].params.addr", sink.name),
                "network sink requires an 'addr' parameter",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ConfigVersion, IngestConfig, NormalizerConfig, SegmenterConfig, SinkConfig, StationConfig,
        TelegramConfig,
    };
    use std::collections::HashMap;

    fn minimal_manifest() -> PipelineManifest {
        PipelineManifest {
            version: ConfigVersion::V1,
            station: StationConfig {
                id: "station-1".into(),
                description: None,
            },
            ingest: IngestConfig {
                raw_dir: "raw_data".into(),
                archive_dir: "compressed_data".into(),
                file_stem: "raw_data".into(),
                settle_secs: 600,
                delete_consumed: true,
            },
            telegram: TelegramConfig::default(),
            segmenter: SegmenterConfig {
                detection_threshold: 3,
                detector: DetectorConfig::SingleBeam {
                    range_threshold: 1800,
                },
            },
            normalizer: NormalizerConfig {
                rows: 64,
                cols: 1,
                full_scale: 4000,
            },
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 100,
                params: HashMap::new(),
            }],
        }
    }

    #[test]
    fn test_valid_manifest() {
        let m = minimal_manifest();
        assert!(validate(&m).is_ok());
    }

    #[test]
    fn test_empty_station_id() {
        let mut m = minimal_manifest();
        m.station.id = "  ".into();
        let err = validate(&m).unwrap_err().to_string();
        assert!(err.contains("station id"), "got: {err}");
    }

    #[test]
    fn test_same_raw_and_archive_dir() {
        let mut m = minimal_manifest();
        m.ingest.archive_dir = m.ingest.raw_dir.clone();
        let err = validate(&m).unwrap_err().to_string();
        assert!(err.contains("must differ"), "got: {err}");
    }

    #[test]
    fn test_telegram_overhead_too_large() {
        let mut m = minimal_manifest();
        m.telegram.expected_fields = 30;
        let err = validate(&m).unwrap_err().to_string();
        assert!(err.contains("expected_fields"), "got: {err}");
    }

    #[test]
    fn test_zero_detection_threshold() {
        let mut m = minimal_manifest();
        m.segmenter.detection_threshold = 0;
        let err = validate(&m).unwrap_err().to_string();
        assert!(err.contains("detection_threshold"), "got: {err}");
    }

    #[test]
    fn test_zero_min_beams() {
        let mut m = minimal_manifest();
        m.segmenter.detector = DetectorConfig::Scanning {
            range_threshold: 2000,
            min_beams: 0,
        };
        let err = validate(&m).unwrap_err().to_string();
        assert!(err.contains("min_beams"), "got: {err}");
    }

    #[test]
    fn test_zero_normalizer_rows() {
        let mut m = minimal_manifest();
        m.normalizer.rows = 0;
        let err = validate(&m).unwrap_err().to_string();
        assert!(err.contains("rows"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut m = minimal_manifest();
        m.sinks.push(m.sinks[0].clone());
        let err = validate(&m).unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_network_sink_requires_addr() {
        let mut m = minimal_manifest();
        m.sinks.push(SinkConfig {
            name: "collector".into(),
            sink_type: SinkType::Network,
            queue_capacity: 100,
            params: HashMap::new(),
        });
        let err = validate(&m).unwrap_err().to_string();
        assert!(err.contains("addr"), "got: {err}");
    }
}
