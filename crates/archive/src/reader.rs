//! Block reading

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use contracts::{HarvestError, MeasurementBlock, MeasurementSource};
use tracing::{debug, instrument};

use crate::error::Result;

/// Archival block reader
///
/// Enumerates `.bin` blocks in sorted (temporal) order and decodes them one
/// at a time. Implements [`MeasurementSource`] for the extraction stage.
pub struct ArchiveReader {
    pending: VecDeque<PathBuf>,
}

impl ArchiveReader {
    /// Open an archive directory
    ///
    /// # Errors
    /// Fails when the directory cannot be listed.
    #[instrument(name = "archive_open", fields(dir = %archive_dir.display()))]
    pub fn open(archive_dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(archive_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("bin") {
                paths.push(path);
            }
        }
        paths.sort();

        debug!(blocks = paths.len(), "archive opened");
        Ok(Self {
            pending: paths.into(),
        })
    }

    /// Read a single block file
    pub fn read_block_file(path: &Path) -> std::result::Result<MeasurementBlock, HarvestError> {
        let file = File::open(path)
            .map_err(|e| HarvestError::block_read(path.display().to_string(), e.to_string()))?;
        bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| HarvestError::block_read(path.display().to_string(), e.to_string()))
    }

    /// Blocks not yet read
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl MeasurementSource for ArchiveReader {
    fn next_block(&mut self) -> std::result::Result<Option<MeasurementBlock>, HarvestError> {
        match self.pending.pop_front() {
            Some(path) => Self::read_block_file(&path).map(Some),
            None => Ok(None),
        }
    }
}
