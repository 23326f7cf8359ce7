//! SampleNormalizer trait - span to fixed-shape sample

use crate::{HarvestError, NormalizedSample, VehicleSpan};

/// Span normalizer
///
/// Contract: the output shape is constant across all spans for a given
/// configuration, regardless of input span length, so downstream storage can
/// treat samples as a uniform table.
pub trait SampleNormalizer: Send {
    /// `(rows, cols)` of every sample this normalizer produces
    fn output_shape(&self) -> (usize, usize);

    /// Produce the fixed-shape sample for one span
    ///
    /// # Errors
    /// Returns `HarvestError::Normalize` for spans that cannot be shaped
    /// (e.g. zero-width rows).
    fn normalize(&self, span: &VehicleSpan) -> Result<NormalizedSample, HarvestError>;
}
