//! MeasurementSource trait - extraction-stage input abstraction
//!
//! Decouples the segmenter from the concrete archival store. The only
//! guarantees the extraction stage relies on are temporal order within a
//! block and blocks arriving in batch order.

use crate::{HarvestError, MeasurementBlock};

/// Ordered block supplier
pub trait MeasurementSource {
    /// Read the next block, or `None` when the source is exhausted.
    ///
    /// # Errors
    /// Returns `HarvestError::BlockRead` for undecodable blocks.
    fn next_block(&mut self) -> Result<Option<MeasurementBlock>, HarvestError>;
}
