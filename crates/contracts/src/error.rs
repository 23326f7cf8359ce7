//! Layered error definitions
//!
//! Categorized by source: config / ingest / archive / segment / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum HarvestError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Ingest Errors =====
    /// Telegram line could not be decoded
    #[error("telegram parse error in '{origin}': {message}")]
    TelegramParse { origin: String, message: String },

    // ===== Archive Errors =====
    /// Archival block write error
    #[error("block write error for batch '{batch_id}': {message}")]
    BlockWrite { batch_id: String, message: String },

    /// Archival block read error
    #[error("block read error at '{path}': {message}")]
    BlockRead { path: String, message: String },

    // ===== Segmentation Errors =====
    /// The occupancy detector failed for a frame; the whole call is aborted
    /// rather than skipping frames, which would shift span boundaries
    #[error("detector failure at frame {frame_index}: {message}")]
    DetectorFailure { frame_index: usize, message: String },

    /// Normalization error
    #[error("normalize error for span [{start}, {end}]: {message}")]
    Normalize {
        start: usize,
        end: usize,
        message: String,
    },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl HarvestError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create telegram parse error
    pub fn telegram_parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TelegramParse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Create block write error
    pub fn block_write(batch_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BlockWrite {
            batch_id: batch_id.into(),
            message: message.into(),
        }
    }

    /// Create block read error
    pub fn block_read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BlockRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create detector failure error
    pub fn detector(frame_index: usize, message: impl Into<String>) -> Self {
        Self::DetectorFailure {
            frame_index,
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
