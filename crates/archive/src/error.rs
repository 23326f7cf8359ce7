//! Archive error types

use thiserror::Error;

/// Archive-local errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Refusing to write a block with no rows
    #[error("refusing to write empty block '{0}'")]
    EmptyBlock(String),

    /// Rows of unequal width cannot form a rectangular block
    #[error("block '{batch_id}' is ragged: row {row} has width {width}, expected {expected}")]
    RaggedBlock {
        batch_id: String,
        row: usize,
        width: usize,
        expected: usize,
    },

    /// Encode/decode failure
    #[error("codec error for '{path}': {message}")]
    Codec { path: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Archive result alias
pub type Result<T> = std::result::Result<T, ArchiveError>;
