//! FileSink - writes samples to disk with folder structure
//!
//! Layout under the base directory:
//!
//! ```text
//! output/
//!     samples/<batch_id>/<span_seq>.bin   # bincode NormalizedSample
//!     meta/<batch_id>/<span_seq>.json     # SpanMeta sidecar
//! ```

use contracts::{HarvestError, NormalizedSample, SampleSink};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./processed_data"));

        Self { base_path }
    }
}

/// Sink that writes samples to disk files
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    created_dirs: HashSet<PathBuf>,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        // Create base directory if it doesn't exist
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            created_dirs: HashSet::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    fn batch_dir(&mut self, kind: &str, batch_id: &str) -> std::io::Result<PathBuf> {
        let dir = self.config.base_path.join(kind).join(batch_id);
        if !self.created_dirs.contains(&dir) {
            fs::create_dir_all(&dir)?;
            self.created_dirs.insert(dir.clone());
        }
        Ok(dir)
    }

    fn write_sample_to_disk(&mut self, sample: &NormalizedSample) -> std::io::Result<()> {
        let batch_id = sample.meta.batch_id.to_string();
        let seq = sample.meta.span_seq;

        // 1. Write SpanMeta sidecar
        let meta_dir = self.batch_dir("meta", &batch_id)?;
        let meta_file = File::create(meta_dir.join(format!("{seq}.json")))?;
        serde_json::to_writer(meta_file, &sample.meta)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        // 2. Write sample grid
        let sample_dir = self.batch_dir("samples", &batch_id)?;
        let file = File::create(sample_dir.join(format!("{seq}.bin")))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, sample)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.flush()?;

        Ok(())
    }

    fn persist_sample(&mut self, sample: &NormalizedSample) -> Result<(), HarvestError> {
        self.write_sample_to_disk(sample).map_err(|e| {
            error!(
                sink = %self.name,
                batch_id = %sample.meta.batch_id,
                span_seq = sample.meta.span_seq,
                error = %e,
                "Write failed"
            );
            HarvestError::sink_write(&self.name, e.to_string())
        })
    }
}

impl SampleSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, sample),
        fields(sink = %self.name, span_seq = sample.meta.span_seq)
    )]
    async fn write(&mut self, sample: &NormalizedSample) -> Result<(), HarvestError> {
        self.persist_sample(sample)?;
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), HarvestError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), HarvestError> {
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}
