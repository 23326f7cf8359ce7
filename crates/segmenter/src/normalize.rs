//! Span normalization
//!
//! Resamples a variable-length span onto a fixed grid so every vehicle sample
//! has the same shape regardless of transit duration or sensor width.

use contracts::{
    HarvestError, Measurement, NormalizedSample, NormalizerConfig, SampleNormalizer, VehicleSpan,
};

/// Nearest-neighbor resampling normalizer
///
/// Time axis: the span's rows are resampled to `rows` by nearest source row.
/// Beam axis: rows wider than `cols` are cropped, narrower rows zero-padded.
/// Values are scaled by `full_scale` and clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct ResampleNormalizer {
    rows: usize,
    cols: usize,
    full_scale: u32,
}

impl ResampleNormalizer {
    /// Create a normalizer from configuration
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            rows: config.rows,
            cols: config.cols,
            full_scale: config.full_scale,
        }
    }

    /// Nearest source row for output row `r`
    ///
    /// Midpoint sampling; degenerates to the identity when lengths match and
    /// to row repetition when the span is shorter than the grid.
    fn source_row(&self, r: usize, len: usize) -> usize {
        let index = ((2 * r + 1) * len) / (2 * self.rows);
        index.min(len - 1)
    }

    fn scale(&self, value: u32) -> f32 {
        (value as f32 / self.full_scale as f32).min(1.0)
    }

    fn emit_row(&self, source: &Measurement, out: &mut Vec<f32>) {
        for c in 0..self.cols {
            let value = source.values.get(c).copied().unwrap_or(0);
            out.push(self.scale(value));
        }
    }
}

impl SampleNormalizer for ResampleNormalizer {
    fn output_shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn normalize(&self, span: &VehicleSpan) -> Result<NormalizedSample, HarvestError> {
        if span.is_empty() {
            return Err(HarvestError::Normalize {
                start: span.meta.start_index,
                end: span.meta.end_index,
                message: "span has no rows".into(),
            });
        }

        let mut values = Vec::with_capacity(self.rows * self.cols);
        for r in 0..self.rows {
            let source = &span.measurements[self.source_row(r, span.len())];
            self.emit_row(source, &mut values);
        }

        Ok(NormalizedSample {
            meta: span.meta.clone(),
            rows: self.rows,
            cols: self.cols,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SpanMeta, SpanTermination};

    fn span(rows: Vec<Vec<u32>>) -> VehicleSpan {
        let end = rows.len().saturating_sub(1);
        VehicleSpan {
            meta: SpanMeta {
                batch_id: "20190612134501".into(),
                span_seq: 0,
                start_index: 0,
                end_index: end,
                lead_padding: 0,
                termination: SpanTermination::Confirmed,
            },
            measurements: rows.into_iter().map(Measurement::new).collect(),
        }
    }

    fn normalizer(rows: usize, cols: usize, full_scale: u32) -> ResampleNormalizer {
        ResampleNormalizer::new(&NormalizerConfig {
            rows,
            cols,
            full_scale,
        })
    }

    #[test]
    fn test_shape_constant_across_span_lengths() {
        let n = normalizer(8, 4, 100);
        for len in [1usize, 3, 8, 20, 117] {
            let s = span(vec![vec![50, 50, 50, 50]; len]);
            let sample = n.normalize(&s).unwrap();
            assert_eq!(sample.shape(), (8, 4));
            assert_eq!(sample.values.len(), 32);
        }
    }

    #[test]
    fn test_value_scaling_and_clamp() {
        let n = normalizer(1, 3, 100);
        let s = span(vec![vec![0, 50, 250]]);
        let sample = n.normalize(&s).unwrap();
        assert_eq!(sample.at(0, 0), 0.0);
        assert_eq!(sample.at(0, 1), 0.5);
        // Above full scale clamps to 1.0
        assert_eq!(sample.at(0, 2), 1.0);
    }

    #[test]
    fn test_crop_and_pad_columns() {
        let n = normalizer(1, 3, 100);

        // Wider row is cropped
        let wide = n.normalize(&span(vec![vec![10, 20, 30, 40]])).unwrap();
        assert_eq!(wide.values, vec![0.1, 0.2, 0.3]);

        // Narrower row is zero-padded
        let narrow = n.normalize(&span(vec![vec![10]])).unwrap();
        assert_eq!(narrow.values, vec![0.1, 0.0, 0.0]);
    }

    #[test]
    fn test_time_axis_downsampling() {
        let n = normalizer(4, 1, 100);
        // Ramp over 8 rows: midpoint sampling picks rows 1, 3, 5, 7
        let s = span((0..8).map(|i| vec![i * 10]).collect());
        let sample = n.normalize(&s).unwrap();
        assert_eq!(sample.at(0, 0), 0.1);
        assert_eq!(sample.at(1, 0), 0.3);
        assert_eq!(sample.at(2, 0), 0.5);
        assert_eq!(sample.at(3, 0), 0.7);
    }

    #[test]
    fn test_upsampling_single_row() {
        let n = normalizer(4, 2, 100);
        let s = span(vec![vec![30, 60]]);
        let sample = n.normalize(&s).unwrap();
        // Every output row repeats the only source row
        for r in 0..4 {
            assert_eq!(sample.at(r, 0), 0.3);
            assert_eq!(sample.at(r, 1), 0.6);
        }
    }

    #[test]
    fn test_empty_span_is_an_error() {
        let n = normalizer(4, 2, 100);
        let err = n.normalize(&span(vec![])).unwrap_err();
        assert!(matches!(err, HarvestError::Normalize { .. }));
    }
}
