//! Extraction metric collection
//!
//! Records per-span and per-block metrics and aggregates them in memory for
//! the end-of-run summary.

use contracts::{SpanMeta, SpanTermination};
use metrics::{counter, gauge, histogram};

/// Record metrics for one emitted span
///
/// Call once per span the segmenter emits.
pub fn record_span_metrics(meta: &SpanMeta, span_len: usize) {
    counter!("lidar_harvest_extracted_spans_total").increment(1);
    gauge!("lidar_harvest_last_span_end_index").set(meta.end_index as f64);

    histogram!("lidar_harvest_extracted_span_length").record(span_len as f64);
    histogram!("lidar_harvest_span_lead_padding").record(meta.lead_padding as f64);

    if meta.termination == SpanTermination::EndOfInput {
        counter!("lidar_harvest_partial_spans_total").increment(1);
    }
}

/// Record metrics for one processed block
pub fn record_block_metrics(rows: usize, spans: usize) {
    counter!("lidar_harvest_blocks_processed_total").increment(1);
    histogram!("lidar_harvest_block_rows").record(rows as f64);
    histogram!("lidar_harvest_block_spans").record(spans as f64);
}

/// Record a sample dispatch outcome
pub fn record_sample_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "lidar_harvest_samples_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Extraction metrics aggregator
///
/// Aggregates metrics in memory for the printable end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct ExtractionAggregator {
    /// Blocks processed
    pub total_blocks: u64,

    /// Frames scanned
    pub total_frames: u64,

    /// Spans emitted
    pub total_spans: u64,

    /// Spans cut short by end of input
    pub partial_spans: u64,

    /// Span length statistics (frames)
    pub span_length_stats: RunningStats,

    /// Lead padding statistics (frames)
    pub lead_padding_stats: RunningStats,
}

impl ExtractionAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed block
    pub fn note_block(&mut self, rows: usize) {
        self.total_blocks += 1;
        self.total_frames += rows as u64;
    }

    /// Record one emitted span
    pub fn note_span(&mut self, meta: &SpanMeta, span_len: usize) {
        self.total_spans += 1;
        if meta.termination == SpanTermination::EndOfInput {
            self.partial_spans += 1;
        }
        self.span_length_stats.push(span_len as f64);
        self.lead_padding_stats.push(meta.lead_padding as f64);
    }

    /// Produce the summary report
    pub fn summary(&self) -> ExtractionSummary {
        ExtractionSummary {
            total_blocks: self.total_blocks,
            total_frames: self.total_frames,
            total_spans: self.total_spans,
            partial_spans: self.partial_spans,
            spans_per_block: if self.total_blocks > 0 {
                self.total_spans as f64 / self.total_blocks as f64
            } else {
                0.0
            },
            span_length: StatsSummary::from(&self.span_length_stats),
            lead_padding: StatsSummary::from(&self.lead_padding_stats),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Extraction summary
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub total_blocks: u64,
    pub total_frames: u64,
    pub total_spans: u64,
    pub partial_spans: u64,
    pub spans_per_block: f64,
    pub span_length: StatsSummary,
    pub lead_padding: StatsSummary,
}

impl std::fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Extraction Summary ===")?;
        writeln!(f, "Blocks processed: {}", self.total_blocks)?;
        writeln!(f, "Frames scanned: {}", self.total_frames)?;
        writeln!(
            f,
            "Vehicles extracted: {} ({} partial)",
            self.total_spans, self.partial_spans
        )?;
        writeln!(f, "Vehicles per block: {:.2}", self.spans_per_block)?;
        writeln!(f, "Span length (frames): {}", self.span_length)?;
        writeln!(f, "Lead padding (frames): {}", self.lead_padding)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
