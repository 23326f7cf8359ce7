//! Ingest pipeline main entry
//!
//! Streams per-file ingest results to the compression stage. File reading is
//! blocking disk IO, so it runs on the blocking pool and feeds an
//! async-channel the stage loop consumes; file order is preserved.

use std::path::PathBuf;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use tracing::{error, info, instrument};

use crate::metrics::IngestionMetrics;
use crate::reader::{LogReader, RawLogFile};
use crate::telegram::TelegramParser;

/// Ingest pipeline
///
/// One instance per compression run.
pub struct IngestPipeline {
    parser: TelegramParser,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Result sender (moved into the reader task)
    tx: Sender<RawLogFile>,

    /// Result receiver
    rx: Option<Receiver<RawLogFile>>,
}

impl IngestPipeline {
    /// Create a new ingest pipeline
    ///
    /// # Arguments
    /// * `telegram` - Telegram grammar
    /// * `channel_capacity` - Files buffered between reader and consumer
    pub fn new(telegram: contracts::TelegramConfig, channel_capacity: usize) -> Self {
        let (tx, rx) = bounded(channel_capacity);

        Self {
            parser: TelegramParser::new(telegram),
            metrics: Arc::new(IngestionMetrics::new()),
            tx,
            rx: Some(rx),
        }
    }

    /// Spawn the blocking reader task over the given files
    ///
    /// Files are read sequentially in the given order; a file that cannot be
    /// opened is logged and left in place (it is not reported downstream, so
    /// it will not be deleted as consumed).
    #[instrument(name = "ingest_spawn_reader", skip(self, files), fields(count = files.len()))]
    pub fn spawn_reader(&self, files: Vec<PathBuf>) -> tokio::task::JoinHandle<()> {
        let reader = LogReader::new(self.parser.clone(), self.metrics.clone());
        let metrics = self.metrics.clone();
        let tx = self.tx.clone();

        tokio::task::spawn_blocking(move || {
            info!(files = files.len(), "ingest reader started");

            for path in files {
                match reader.read_file(&path) {
                    Ok(raw_file) => {
                        metrics.record_file();
                        if tx.send_blocking(raw_file).is_err() {
                            // Consumer gone; nothing left to do
                            break;
                        }
                    }
                    Err(e) => {
                        error!(
                            file = %path.display(),
                            error = %e,
                            "could not open input file, skipping"
                        );
                    }
                }
            }
        })
    }

    /// Get the result receiver
    ///
    /// Note: can only be called once, subsequent calls return None.
    pub fn take_receiver(&mut self) -> Option<Receiver<RawLogFile>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Close the sender side so a drained receiver terminates
    pub fn finish(self) {
        drop(self.tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TelegramConfig;
    use std::fs;
    use tempfile::tempdir;

    fn encode_line(telegram: &str) -> String {
        let hex: String = telegram.bytes().map(|b| format!("{b:02X}")).collect();
        format!("2019-06-12 13:45:01.123 <{hex}>")
    }

    fn small_grammar() -> TelegramConfig {
        TelegramConfig {
            expected_fields: 7,
            header_fields: 3,
            trailer_fields: 2,
        }
    }

    #[test]
    fn test_take_receiver_once() {
        let mut pipeline = IngestPipeline::new(small_grammar(), 4);
        assert!(pipeline.take_receiver().is_some());
        assert!(pipeline.take_receiver().is_none());
    }

    #[tokio::test]
    async fn test_reader_preserves_file_order() {
        let dir = tempdir().unwrap();
        let line = encode_line("sSN LMDscandata 2 A B 0 0");
        let first = dir.path().join("raw_data_1.log");
        let second = dir.path().join("raw_data_2.log");
        fs::write(&first, format!("{line}\n")).unwrap();
        fs::write(&second, format!("{line}\n{line}\n")).unwrap();

        let mut pipeline = IngestPipeline::new(small_grammar(), 4);
        let rx = pipeline.take_receiver().unwrap();
        let handle = pipeline.spawn_reader(vec![first.clone(), second.clone()]);

        let a = rx.recv().await.unwrap();
        let b = rx.recv().await.unwrap();
        assert_eq!(a.path, first);
        assert_eq!(a.measurements.len(), 1);
        assert_eq!(b.path, second);
        assert_eq!(b.measurements.len(), 2);

        handle.await.unwrap();
        pipeline.finish();
        assert!(rx.recv().await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_file_skipped() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("raw_data_1.log");
        fs::write(&good, format!("{}\n", encode_line("sSN LMDscandata 2 A B 0 0"))).unwrap();
        let missing = dir.path().join("raw_data_9.log");

        let mut pipeline = IngestPipeline::new(small_grammar(), 4);
        let rx = pipeline.take_receiver().unwrap();
        let handle = pipeline.spawn_reader(vec![missing, good.clone()]);
        handle.await.unwrap();
        pipeline.finish();

        let only = rx.recv().await.unwrap();
        assert_eq!(only.path, good);
        assert!(rx.recv().await.is_err());
    }
}
