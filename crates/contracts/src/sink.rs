//! SampleSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for sinks.

use crate::{HarvestError, NormalizedSample};

/// Sample output trait
///
/// All sink implementations must implement this trait. Writes are append-only;
/// ordering across sinks is not guaranteed to matter.
#[trait_variant::make(SampleSink: Send)]
pub trait LocalSampleSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one normalized sample
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, sample: &NormalizedSample) -> Result<(), HarvestError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), HarvestError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), HarvestError>;
}
