//! LogSink - logs sample summary via tracing

use contracts::{HarvestError, NormalizedSample, SampleSink};
use tracing::{info, instrument};

/// Sink that logs sample summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_sample_summary(&self, sample: &NormalizedSample) {
        info!(
            sink = %self.name,
            batch_id = %sample.meta.batch_id,
            span_seq = sample.meta.span_seq,
            span_start = sample.meta.start_index,
            span_end = sample.meta.end_index,
            partial = sample.meta.termination == contracts::SpanTermination::EndOfInput,
            rows = sample.rows,
            cols = sample.cols,
            "NormalizedSample received"
        );
    }
}

impl SampleSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, sample),
        fields(sink = %self.name, span_seq = sample.meta.span_seq)
    )]
    async fn write(&mut self, sample: &NormalizedSample) -> Result<(), HarvestError> {
        self.log_sample_summary(sample);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), HarvestError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), HarvestError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SpanMeta, SpanTermination};

    fn sample() -> NormalizedSample {
        NormalizedSample {
            meta: SpanMeta {
                batch_id: "20190612134501".into(),
                span_seq: 0,
                start_index: 1,
                end_index: 7,
                lead_padding: 3,
                termination: SpanTermination::Confirmed,
            },
            rows: 1,
            cols: 1,
            values: vec![0.5],
        }
    }

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let result = sink.write(&sample()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
