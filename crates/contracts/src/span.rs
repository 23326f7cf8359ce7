//! VehicleSpan - Segmenter output
//!
//! One detected vehicle transit: a contiguous, padded run of measurements.

use serde::{Deserialize, Serialize};

use crate::{BatchId, Measurement};

/// How a span was terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanTermination {
    /// Closed by a debounced exit transition
    Confirmed,
    /// Input ended while still recording; the pending trailing empty run was
    /// removed and the span emitted as partial
    EndOfInput,
}

/// Span metadata
///
/// Travels with the span through normalization so sinks and metrics can
/// report where in the source block each sample came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanMeta {
    /// Source block identifier
    pub batch_id: BatchId,

    /// Per-block span sequence number (0-based, temporal order)
    pub span_seq: u64,

    /// First row index of the span, inclusive (lead padding included)
    pub start_index: usize,

    /// Last row index of the span, inclusive
    pub end_index: usize,

    /// Frames of lead context actually prepended (may be fewer than the
    /// detection threshold near the block start or a previous span)
    pub lead_padding: usize,

    /// Termination flag
    pub termination: SpanTermination,
}

impl SpanMeta {
    /// First strictly-occupied row index
    pub fn strict_start(&self) -> usize {
        self.start_index + self.lead_padding
    }
}

/// One detected vehicle transit.
///
/// Owned exclusively by the segmenter until emitted; ownership then transfers
/// to the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSpan {
    /// Span metadata
    pub meta: SpanMeta,

    /// The measurement rows, `meta.start_index ..= meta.end_index`
    pub measurements: Vec<Measurement>,
}

impl VehicleSpan {
    /// Number of rows in the span
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// True for an empty span (never emitted by the segmenter)
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// True when the span was cut short by end of input
    pub fn is_partial(&self) -> bool {
        self.meta.termination == SpanTermination::EndOfInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_start() {
        let meta = SpanMeta {
            batch_id: "20190612134501".into(),
            span_seq: 0,
            start_index: 1,
            end_index: 7,
            lead_padding: 3,
            termination: SpanTermination::Confirmed,
        };
        assert_eq!(meta.strict_start(), 4);
    }

    #[test]
    fn test_partial_flag() {
        let span = VehicleSpan {
            meta: SpanMeta {
                batch_id: "20190612134501".into(),
                span_seq: 1,
                start_index: 6,
                end_index: 10,
                lead_padding: 2,
                termination: SpanTermination::EndOfInput,
            },
            measurements: vec![Measurement::new(vec![10]); 5],
        };
        assert!(span.is_partial());
        assert_eq!(span.len(), 5);
    }
}
