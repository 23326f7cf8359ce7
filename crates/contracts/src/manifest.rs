//! PipelineManifest - Config Loader output
//!
//! Describes a full station configuration: identity, ingest directories,
//! telegram grammar, segmentation, normalization, output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full station pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineManifest {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Station identity
    pub station: StationConfig,

    /// Raw log ingestion settings
    pub ingest: IngestConfig,

    /// Telegram grammar settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Vehicle segmentation settings
    pub segmenter: SegmenterConfig,

    /// Sample normalization settings
    pub normalizer: NormalizerConfig,

    /// Output routing configuration
    pub sinks: Vec<SinkConfig>,
}

/// Station identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Station identifier (e.g., "a9-km41-north")
    pub id: String,

    /// Free-form description (optional)
    #[serde(default)]
    pub description: Option<String>,
}

/// Raw log ingestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory the sensor writes raw telegram logs into
    pub raw_dir: PathBuf,

    /// Directory archival blocks are written to
    pub archive_dir: PathBuf,

    /// Expected raw file stem ("raw_data" matches raw_data.log and
    /// raw_data_<digits>.log)
    #[serde(default = "default_file_stem")]
    pub file_stem: String,

    /// Seconds a raw file must be quiescent before it is picked up,
    /// letting the sensor finish writing (3x the output interval suggested)
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    /// Delete raw files after a successful block write
    #[serde(default = "default_delete_consumed")]
    pub delete_consumed: bool,
}

fn default_file_stem() -> String {
    "raw_data".to_string()
}

fn default_settle_secs() -> u64 {
    600
}

fn default_delete_consumed() -> bool {
    true
}

/// Telegram grammar settings
///
/// Defaults match the sSN LMDscandata (CoLa A, hex) subset the station
/// sensor emits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Total whitespace-separated fields per decoded telegram
    #[serde(default = "default_expected_fields")]
    pub expected_fields: usize,

    /// Leading header fields before the data points (the last header field
    /// declares the data point count)
    #[serde(default = "default_header_fields")]
    pub header_fields: usize,

    /// Trailing fields after the data points
    #[serde(default = "default_trailer_fields")]
    pub trailer_fields: usize,
}

fn default_expected_fields() -> usize {
    413
}

fn default_header_fields() -> usize {
    26
}

fn default_trailer_fields() -> usize {
    6
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            expected_fields: default_expected_fields(),
            header_fields: default_header_fields(),
            trailer_fields: default_trailer_fields(),
        }
    }
}

impl TelegramConfig {
    /// Data points implied by the field layout
    pub fn data_points(&self) -> usize {
        self.expected_fields
            .saturating_sub(self.header_fields)
            .saturating_sub(self.trailer_fields)
    }
}

/// Vehicle segmentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Debounce window in frames: consecutive confirming/disconfirming
    /// measurements required before a state transition commits. Also the
    /// lead-context padding length.
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: usize,

    /// Occupancy detector selection
    pub detector: DetectorConfig,
}

fn default_detection_threshold() -> usize {
    3
}

/// Occupancy detector selection and thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DetectorConfig {
    /// Single-beam sensor: occupied when the mean range drops below the
    /// threshold (a vehicle is closer than the empty-road background)
    SingleBeam {
        /// Range threshold in raw sensor units
        range_threshold: u32,
    },

    /// Scanning sensor: occupied when at least `min_beams` beams read below
    /// the threshold
    Scanning {
        /// Range threshold in raw sensor units
        range_threshold: u32,
        /// Minimum number of near beams
        min_beams: usize,
    },
}

/// Sample normalization settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Output rows (time axis)
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Output columns (beam axis)
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Raw value mapped to 1.0; larger raw values are clamped
    pub full_scale: u32,
}

fn default_rows() -> usize {
    64
}

fn default_cols() -> usize {
    32
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log summaries via tracing
    Log,
    /// Sample files under a base directory
    File,
    /// UDP stream to a collector
    Network,
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Unique sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Worker queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters (e.g. base_path, addr)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_defaults() {
        let t = TelegramConfig::default();
        assert_eq!(t.expected_fields, 413);
        assert_eq!(t.header_fields, 26);
        assert_eq!(t.trailer_fields, 6);
        assert_eq!(t.data_points(), 381);
    }

    #[test]
    fn test_detector_config_toml() {
        let toml_str = r#"
mode = "scanning"
range_threshold = 2400
min_beams = 5
"#;
        let cfg: DetectorConfig = toml::from_str(toml_str).unwrap();
        match cfg {
            DetectorConfig::Scanning {
                range_threshold,
                min_beams,
            } => {
                assert_eq!(range_threshold, 2400);
                assert_eq!(min_beams, 5);
            }
            other => panic!("unexpected detector config: {other:?}"),
        }
    }

    #[test]
    fn test_manifest_json_round_trip() {
        let manifest = PipelineManifest {
            version: ConfigVersion::V1,
            station: StationConfig {
                id: "test-station".into(),
                description: None,
            },
            ingest: IngestConfig {
                raw_dir: "raw_data".into(),
                archive_dir: "compressed_data".into(),
                file_stem: default_file_stem(),
                settle_secs: 0,
                delete_consumed: false,
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
            sinks: vec![],
        };

        let json = serde_json::to_string(&manifest).unwrap();
        let back: PipelineManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.station.id, "test-station");
        assert_eq!(back.segmenter.detection_threshold, 3);
    }
}
