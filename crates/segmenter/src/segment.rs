//! Vehicle-detection state machine

use std::collections::VecDeque;

use contracts::{
    BatchId, HarvestError, Measurement, MeasurementBlock, OccupancyDetector, SpanMeta,
    SpanTermination, VehicleSpan,
};
use tracing::{debug, instrument};

/// Segmenter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentState {
    /// No vehicle in view
    Idle,
    /// Accumulating a vehicle span
    Recording,
}

/// Vehicle-detection segmenter
///
/// Online state machine over a time-ordered occupancy signal. A transition in
/// either direction commits only after more than `threshold` consecutive
/// supporting frames; a frame contradicting the pending transition resets the
/// counter. Confirmed entries are back-filled with the debounced occupied
/// frames plus up to `threshold` frames of lead context; confirmed exits trim
/// the trailing empty run, so an emitted span starts `threshold` frames before
/// the occupancy run and ends on its last occupied frame.
///
/// Spans never overlap: lead context is clamped to one past the previous
/// span's end. A span still open at end of input is emitted by [`finish`]
/// flagged [`SpanTermination::EndOfInput`].
///
/// [`finish`]: Segmenter::finish
pub struct Segmenter<D> {
    threshold: usize,
    detector: D,
    state: SegmentState,
    /// Consecutive frames supporting the pending transition
    run_count: usize,
    /// Recent frames for entry back-fill, capped at 2x threshold
    history: VecDeque<(usize, Measurement)>,
    /// Rows accumulated while recording, including pending-exit frames
    current: Vec<Measurement>,
    span_start: usize,
    lead_padding: usize,
    /// Next frame index
    cursor: usize,
    last_emitted_end: Option<usize>,
    batch_id: BatchId,
    span_seq: u64,
}

impl<D: OccupancyDetector> Segmenter<D> {
    /// Create a segmenter
    ///
    /// `threshold` is the debounce window in frames; values below 1 are
    /// rejected by config validation upstream.
    pub fn new(threshold: usize, detector: D) -> Self {
        Self {
            threshold,
            detector,
            state: SegmentState::Idle,
            run_count: 0,
            history: VecDeque::with_capacity(2 * threshold),
            current: Vec::new(),
            span_start: 0,
            lead_padding: 0,
            cursor: 0,
            last_emitted_end: None,
            batch_id: BatchId::default(),
            span_seq: 0,
        }
    }

    /// Debounce window in frames
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Spans emitted since the last reset
    pub fn spans_emitted(&self) -> u64 {
        self.span_seq
    }

    /// True while a span is being accumulated
    pub fn is_recording(&self) -> bool {
        self.state == SegmentState::Recording
    }

    /// Process one whole block
    ///
    /// Resets per-block state first, so one segmenter instance can be reused
    /// across blocks sequentially. Returns the emitted spans in temporal
    /// order, including a trailing [`SpanTermination::EndOfInput`] span when
    /// the block ends mid-vehicle.
    #[instrument(
        name = "segmenter_process",
        skip(self, block),
        fields(batch_id = %block.batch_id, rows = block.len())
    )]
    pub fn process(&mut self, block: &MeasurementBlock) -> Result<Vec<VehicleSpan>, HarvestError> {
        self.reset();
        self.batch_id = block.batch_id.clone();

        let mut spans = Vec::new();
        for measurement in &block.measurements {
            if let Some(span) = self.push(measurement.clone())? {
                spans.push(span);
            }
        }
        if let Some(span) = self.finish() {
            spans.push(span);
        }

        debug!(
            batch_id = %block.batch_id,
            spans = spans.len(),
            "block segmented"
        );
        Ok(spans)
    }

    /// Feed one frame; returns a span when one closes on this frame
    ///
    /// # Errors
    /// A detector failure aborts the call with the offending frame index;
    /// frames are never skipped, which would shift span boundaries.
    pub fn push(&mut self, measurement: Measurement) -> Result<Option<VehicleSpan>, HarvestError> {
        let index = self.cursor;
        let occupied = self
            .detector
            .detect(&measurement)
            .map_err(|e| HarvestError::detector(index, e.to_string()))?;
        self.cursor += 1;

        let mut emitted = None;
        match (self.state, occupied) {
            (SegmentState::Idle, false) => {
                self.run_count = 0;
            }
            (SegmentState::Idle, true) => {
                self.run_count += 1;
                if self.run_count > self.threshold {
                    self.run_count = 0;
                    self.begin_span(index);
                    self.state = SegmentState::Recording;
                }
            }
            (SegmentState::Recording, false) => {
                self.run_count += 1;
                if self.run_count > self.threshold {
                    self.run_count = 0;
                    emitted = Some(self.close_span(self.threshold, SpanTermination::Confirmed));
                    self.state = SegmentState::Idle;
                }
            }
            (SegmentState::Recording, true) => {
                self.run_count = 0;
            }
        }

        // Appended for every frame while recording, including frames counted
        // toward a pending exit; the exit trim cancels exactly those.
        if self.state == SegmentState::Recording {
            self.current.push(measurement.clone());
        }

        self.remember(index, measurement);
        Ok(emitted)
    }

    /// Flush at end of input
    ///
    /// A span still open is emitted flagged `EndOfInput`, with the pending
    /// trailing empty run removed so the partial span still ends on an
    /// occupied frame.
    pub fn finish(&mut self) -> Option<VehicleSpan> {
        if self.state != SegmentState::Recording {
            self.run_count = 0;
            return None;
        }

        let trim = self.run_count;
        self.run_count = 0;
        self.state = SegmentState::Idle;
        Some(self.close_span(trim, SpanTermination::EndOfInput))
    }

    /// Clear all per-block state
    pub fn reset(&mut self) {
        self.state = SegmentState::Idle;
        self.run_count = 0;
        self.history.clear();
        self.current.clear();
        self.span_start = 0;
        self.lead_padding = 0;
        self.cursor = 0;
        self.last_emitted_end = None;
        self.batch_id = BatchId::default();
        self.span_seq = 0;
    }

    /// Open a span at a confirmed entry
    ///
    /// The debounced occupied frames are `trigger - threshold .. trigger`;
    /// lead context reaches a further `threshold` frames back, clamped to the
    /// sequence start and to one past the previous span's end.
    fn begin_span(&mut self, trigger: usize) {
        let strict_start = trigger - self.threshold;
        let floor = self.last_emitted_end.map(|end| end + 1).unwrap_or(0);
        let start = strict_start.saturating_sub(self.threshold).max(floor);

        self.span_start = start;
        self.lead_padding = strict_start - start;
        self.current.clear();
        for (index, measurement) in &self.history {
            if *index >= start && *index < trigger {
                self.current.push(measurement.clone());
            }
        }
    }

    /// Close the current span, trimming `trim` trailing frames
    fn close_span(&mut self, trim: usize, termination: SpanTermination) -> VehicleSpan {
        let kept = self.current.len() - trim;
        self.current.truncate(kept);

        let end_index = self.span_start + kept - 1;
        self.last_emitted_end = Some(end_index);

        let meta = SpanMeta {
            batch_id: self.batch_id.clone(),
            span_seq: self.span_seq,
            start_index: self.span_start,
            end_index,
            lead_padding: self.lead_padding,
            termination,
        };
        self.span_seq += 1;

        let label = match termination {
            SpanTermination::Confirmed => "confirmed",
            SpanTermination::EndOfInput => "end_of_input",
        };
        metrics::counter!("lidar_harvest_spans_total", "termination" => label).increment(1);
        metrics::histogram!("lidar_harvest_span_length_frames").record(kept as f64);

        debug!(
            batch_id = %meta.batch_id,
            span_seq = meta.span_seq,
            start = meta.start_index,
            end = meta.end_index,
            lead = meta.lead_padding,
            termination = label,
            "span emitted"
        );

        VehicleSpan {
            meta,
            measurements: std::mem::take(&mut self.current),
        }
    }

    /// Keep the last 2x threshold frames for entry back-fill
    fn remember(&mut self, index: usize, measurement: Measurement) {
        self.history.push_back((index, measurement));
        while self.history.len() > 2 * self.threshold {
            self.history.pop_front();
        }
    }
}
