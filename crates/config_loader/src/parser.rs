//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{HarvestError, PipelineManifest};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML manifest
pub fn parse_toml(content: &str) -> Result<PipelineManifest, HarvestError> {
    toml::from_str(content).map_err(|e| HarvestError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON manifest
pub fn parse_json(content: &str) -> Result<PipelineManifest, HarvestError> {
    serde_json::from_str(content).map_err(|e| HarvestError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse manifest content per format
pub fn parse(content: &str, format: ConfigFormat) -> Result<PipelineManifest, HarvestError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}
