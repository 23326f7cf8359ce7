//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON manifest files
//! - Validate configuration legality
//! - Produce a `PipelineManifest`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let manifest = ConfigLoader::load_from_path(Path::new("manifest.toml")).unwrap();
//! println!("Station: {}", manifest.station.id);
//! ```

mod parser;
mod validator;

pub use contracts::PipelineManifest;
pub use parser::ConfigFormat;

use contracts::HarvestError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load a manifest from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<PipelineManifest, HarvestError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineManifest, HarvestError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize a manifest to TOML string
    pub fn to_toml(manifest: &PipelineManifest) -> Result<String, HarvestError> {
        toml::to_string_pretty(manifest)
            .map_err(|e| HarvestError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a manifest to JSON string
    pub fn to_json(manifest: &PipelineManifest) -> Result<String, HarvestError> {
        serde_json::to_string_pretty(manifest)
            .map_err(|e| HarvestError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, HarvestError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            HarvestError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            HarvestError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, HarvestError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineManifest, HarvestError> {
        let manifest = parser::parse(content, format)?;
        validator::validate(&manifest)?;
        Ok(manifest)
    }
}
