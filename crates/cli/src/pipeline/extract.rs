//! Extraction stage orchestrator - archival blocks to dispatched samples.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use archive::ArchiveReader;
use contracts::{
    MeasurementSource, NormalizedSample, PipelineManifest, SampleNormalizer,
};
use observability::{record_block_metrics, record_span_metrics};
use segmenter::{build_detector, ResampleNormalizer, Segmenter};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::ExtractStats;

/// Extraction stage
pub struct ExtractStage {
    manifest: PipelineManifest,
    buffer_size: usize,
    max_blocks: Option<u64>,
}

impl ExtractStage {
    /// Create the stage
    pub fn new(manifest: PipelineManifest, buffer_size: usize, max_blocks: Option<u64>) -> Self {
        Self {
            manifest,
            buffer_size,
            max_blocks,
        }
    }

    /// Run extraction over the whole archive
    pub async fn run(&self) -> Result<ExtractStats> {
        let start = Instant::now();

        let mut source = ArchiveReader::open(&self.manifest.ingest.archive_dir)
            .context("cannot open archive directory")?;
        info!(
            blocks = source.remaining(),
            archive = %self.manifest.ingest.archive_dir.display(),
            "extraction started"
        );

        let detector = build_detector(&self.manifest.segmenter.detector);
        let mut seg = Segmenter::new(self.manifest.segmenter.detection_threshold, detector);
        let normalizer = ResampleNormalizer::new(&self.manifest.normalizer);

        // Dispatcher with its own sink workers
        let (sample_tx, sample_rx) = mpsc::channel::<NormalizedSample>(self.buffer_size);
        if self.manifest.sinks.is_empty() {
            warn!("no sinks configured - samples will be dropped");
        }
        let dispatcher = dispatcher::create_dispatcher(self.manifest.sinks.clone(), sample_rx)
            .await
            .context("failed to create dispatcher")?;
        let active_sinks = self.manifest.sinks.len();
        let dispatcher_handle = dispatcher.spawn();

        let mut stats = ExtractStats {
            active_sinks,
            ..Default::default()
        };

        'blocks: while let Some(block) = source.next_block()? {
            let spans = seg
                .process(&block)
                .with_context(|| format!("segmentation failed for batch '{}'", block.batch_id))?;

            record_block_metrics(block.len(), spans.len());
            stats.extraction.note_block(block.len());
            stats.blocks_processed += 1;

            for span in spans {
                record_span_metrics(&span.meta, span.len());
                stats.extraction.note_span(&span.meta, span.len());

                let sample = normalizer
                    .normalize(&span)
                    .with_context(|| format!("normalization failed for batch '{}'", block.batch_id))?;

                if sample_tx.send(sample).await.is_err() {
                    warn!("dispatcher channel closed");
                    break 'blocks;
                }
                stats.samples_dispatched += 1;
            }

            info!(
                batch_id = %block.batch_id,
                rows = block.len(),
                vehicles = stats.extraction.total_spans,
                "block processed"
            );

            if let Some(max) = self.max_blocks {
                if stats.blocks_processed >= max {
                    info!(blocks = stats.blocks_processed, "reached max blocks limit");
                    break;
                }
            }
        }

        // Close the channel and let sink workers drain
        drop(sample_tx);
        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        stats.duration = start.elapsed();
        info!(
            blocks = stats.blocks_processed,
            samples = stats.samples_dispatched,
            duration_secs = stats.duration.as_secs_f64(),
            "extraction complete"
        );

        Ok(stats)
    }
}
