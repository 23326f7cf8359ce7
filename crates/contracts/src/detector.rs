//! OccupancyDetector trait - Segmenter input interface
//!
//! Decides presence/absence per measurement, polymorphic over sensor modality.

use crate::{HarvestError, Measurement};

/// Occupancy predicate
///
/// The segmenter treats implementations as opaque; stateful detectors (e.g.
/// adaptive baselines) are allowed, hence `&mut self`.
pub trait OccupancyDetector: Send {
    /// Classify one measurement as occupied (vehicle present) or empty.
    ///
    /// # Errors
    /// A failing detector aborts the surrounding segmentation call; frames
    /// are never silently skipped because that would shift span boundaries.
    fn detect(&mut self, measurement: &Measurement) -> Result<bool, HarvestError>;
}

/// Boxed detector for configurations resolved at runtime
pub type BoxedDetector = Box<dyn OccupancyDetector>;

impl OccupancyDetector for BoxedDetector {
    fn detect(&mut self, measurement: &Measurement) -> Result<bool, HarvestError> {
        (**self).detect(measurement)
    }
}
