//! Block writing

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use contracts::{BatchId, MeasurementBlock};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{ArchiveError, Result};

/// Sidecar metadata written next to each block file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockMeta {
    /// Batch identifier
    pub batch_id: BatchId,

    /// Row count
    pub rows: usize,

    /// Beam count per row
    pub width: usize,

    /// Raw files the block was compressed from
    pub source_files: Vec<String>,

    /// Lines skipped during ingestion
    pub skipped_lines: u64,

    /// Local wall clock at write time (RFC 3339)
    pub written_at: String,
}

/// Derive the batch id from the first line's clock digits, falling back to
/// the local wall clock when the prefix was absent or malformed
pub fn derive_batch_id(clock_digits: Option<&str>) -> BatchId {
    match clock_digits {
        Some(digits) => BatchId::new(digits),
        None => BatchId::from(Local::now().format("%Y%m%d%H%M%S").to_string()),
    }
}

/// Archival block writer
pub struct ArchiveWriter {
    archive_dir: PathBuf,
}

impl ArchiveWriter {
    /// Create a writer, creating the archive directory if needed
    pub fn new(archive_dir: impl Into<PathBuf>) -> Result<Self> {
        let archive_dir = archive_dir.into();
        fs::create_dir_all(&archive_dir)?;
        Ok(Self { archive_dir })
    }

    /// Archive directory
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Write one block plus its sidecar; returns the block file path
    ///
    /// # Errors
    /// Empty and ragged blocks are rejected; partial files are removed on a
    /// failed write so the reader never sees a torn block.
    #[instrument(
        name = "archive_write_block",
        skip(self, block, source_files),
        fields(batch_id = %block.batch_id, rows = block.len())
    )]
    pub fn write_block(
        &self,
        block: &MeasurementBlock,
        source_files: Vec<String>,
        skipped_lines: u64,
    ) -> Result<PathBuf> {
        self.check_shape(block)?;

        let block_path = self.archive_dir.join(format!("{}.bin", block.batch_id));
        let meta_path = self
            .archive_dir
            .join(format!("{}.meta.json", block.batch_id));

        if let Err(e) = self.encode_block(block, &block_path) {
            let _ = fs::remove_file(&block_path);
            return Err(e);
        }

        let meta = BlockMeta {
            batch_id: block.batch_id.clone(),
            rows: block.len(),
            width: block.width().unwrap_or(0),
            source_files,
            skipped_lines,
            written_at: Local::now().to_rfc3339(),
        };
        let meta_file = File::create(&meta_path)?;
        serde_json::to_writer_pretty(meta_file, &meta).map_err(|e| ArchiveError::Codec {
            path: meta_path.display().to_string(),
            message: e.to_string(),
        })?;

        info!(
            batch_id = %block.batch_id,
            rows = block.len(),
            path = %block_path.display(),
            "block archived"
        );

        Ok(block_path)
    }

    fn check_shape(&self, block: &MeasurementBlock) -> Result<()> {
        if block.is_empty() {
            return Err(ArchiveError::EmptyBlock(block.batch_id.to_string()));
        }

        let expected = block.width().unwrap_or(0);
        for (row, measurement) in block.measurements.iter().enumerate() {
            if measurement.width() != expected {
                return Err(ArchiveError::RaggedBlock {
                    batch_id: block.batch_id.to_string(),
                    row,
                    width: measurement.width(),
                    expected,
                });
            }
        }
        Ok(())
    }

    fn encode_block(&self, block: &MeasurementBlock, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, block).map_err(|e| ArchiveError::Codec {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        writer.flush()?;
        Ok(())
    }
}
