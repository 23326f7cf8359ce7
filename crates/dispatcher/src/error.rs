//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-local errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink could not be created
    #[error("failed to create sink '{sink_name}': {message}")]
    SinkCreation { sink_name: String, message: String },

    /// Input channel closed unexpectedly
    #[error("dispatcher input channel closed")]
    InputClosed,
}

impl DispatcherError {
    /// Create sink creation error
    pub fn sink_creation(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
