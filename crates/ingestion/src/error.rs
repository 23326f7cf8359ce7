//! Ingestion error types

use thiserror::Error;

/// Ingestion-local errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Line has no '<' payload delimiter
    #[error("no '<' payload delimiter in line")]
    MissingPayload,

    /// Hex payload length is odd
    #[error("hex payload has odd length {0}")]
    OddHexLength(usize),

    /// Payload contains a non-hex byte pair
    #[error("invalid hex byte '{0}' in payload")]
    InvalidHexByte(String),

    /// Decoded payload is not ASCII text
    #[error("decoded payload is not ASCII")]
    NonAsciiPayload,

    /// Telegram field count mismatch
    #[error("expected {expected} telegram fields, found {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// Declared data point count disagrees with the field layout
    #[error("telegram declares {declared} data points, layout holds {actual}")]
    PointCount { declared: usize, actual: usize },

    /// A data point field is not base-16
    #[error("invalid data point '{text}' at index {index}")]
    InvalidPoint { index: usize, text: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ingestion result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
