//! Compression stage orchestrator - raw logs to archival blocks.

use std::time::Instant;

use anyhow::{Context, Result};
use archive::{derive_batch_id, ArchiveWriter};
use contracts::{MeasurementBlock, PipelineManifest};
use ingestion::{IngestPipeline, LogScanner};
use tracing::{debug, error, info, warn};

use super::CompressStats;

/// Compression stage
///
/// Holds the scanner across passes so per-file bookkeeping (warn-once bad
/// names) survives watch mode.
pub struct CompressStage {
    manifest: PipelineManifest,
    buffer_size: usize,
    scanner: LogScanner,
    writer: ArchiveWriter,
}

impl CompressStage {
    /// Create the stage, preparing the archive directory
    pub fn new(manifest: PipelineManifest, buffer_size: usize) -> Result<Self> {
        let scanner = LogScanner::new(&manifest.ingest);
        let writer = ArchiveWriter::new(&manifest.ingest.archive_dir)
            .context("cannot prepare archive directory")?;

        Ok(Self {
            manifest,
            buffer_size,
            scanner,
            writer,
        })
    }

    /// One compression pass over the currently settled raw files
    ///
    /// Returns `Ok(None)` when there is nothing to do. Raw files are deleted
    /// only after the block write succeeded; files that decoded to nothing
    /// are left in place.
    pub async fn run_once(&mut self) -> Result<Option<CompressStats>> {
        let start = Instant::now();

        let files = self
            .scanner
            .scan()
            .context("cannot list raw data directory")?;
        if files.is_empty() {
            debug!("no settled raw files, nothing to compress");
            return Ok(None);
        }

        info!(files = files.len(), "compression pass started");

        let mut pipeline = IngestPipeline::new(self.manifest.telegram, self.buffer_size);
        let rx = pipeline
            .take_receiver()
            .context("ingest receiver already taken")?;
        let reader_handle = pipeline.spawn_reader(files);
        let metrics = pipeline.metrics();
        pipeline.finish();

        let mut rows = Vec::new();
        let mut consumed = Vec::new();
        let mut lines_skipped = 0u64;
        let mut clock_digits: Option<String> = None;

        while let Ok(raw_file) = rx.recv().await {
            if clock_digits.is_none() {
                clock_digits = raw_file.clock_digits.clone();
            }
            lines_skipped += raw_file.skipped_lines;
            rows.extend(raw_file.measurements);
            consumed.push(raw_file.path);
        }

        if let Err(e) = reader_handle.await {
            error!(error = ?e, "ingest reader task panicked");
        }

        if rows.is_empty() {
            warn!("no telegrams decoded this pass, raw files left in place");
            return Ok(None);
        }

        let snapshot = metrics.snapshot();
        let batch_id = derive_batch_id(clock_digits.as_deref());
        let block = MeasurementBlock::new(batch_id, rows);

        let source_files = consumed
            .iter()
            .map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.display().to_string())
            })
            .collect();

        self.writer
            .write_block(&block, source_files, lines_skipped)
            .context("could not write archival block")?;

        let mut files_deleted = 0u64;
        if self.manifest.ingest.delete_consumed {
            for path in &consumed {
                match std::fs::remove_file(path) {
                    Ok(()) => files_deleted += 1,
                    Err(e) => {
                        warn!(
                            file = %path.display(),
                            error = %e,
                            "could not delete raw data file"
                        );
                    }
                }
            }
        }

        info!(
            batch_id = %block.batch_id,
            rows = block.len(),
            telegrams = snapshot.telegrams_decoded,
            parse_errors = snapshot.parse_errors,
            "compression pass complete"
        );

        Ok(Some(CompressStats {
            blocks_written: 1,
            files_consumed: consumed.len() as u64,
            files_deleted,
            rows_archived: block.len() as u64,
            lines_skipped,
            duration: start.elapsed(),
        }))
    }
}
