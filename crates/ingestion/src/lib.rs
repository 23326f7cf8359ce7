//! # Ingestion
//!
//! Raw telegram log ingestion module.
//!
//! Responsibilities:
//! - Discover raw log files by filename grammar and settle window
//! - Decode hex telegram lines into `Measurement` rows
//! - Per-line warn-and-skip error policy (a bad line costs one frame,
//!   never the batch)
//! - Stream per-file results to the compression stage via async-channel
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{IngestPipeline, LogScanner};
//!
//! let mut scanner = LogScanner::new(&manifest.ingest);
//! let files = scanner.scan()?;
//!
//! let mut pipeline = IngestPipeline::new(manifest.telegram, 16);
//! let rx = pipeline.take_receiver().unwrap();
//! pipeline.spawn_reader(files);
//! while let Ok(raw_file) = rx.recv().await {
//!     // append raw_file.measurements to the block
//! }
//! ```

mod error;
mod metrics;
mod pipeline;
mod reader;
mod scanner;
mod telegram;

pub use contracts::Measurement;
pub use error::{IngestionError, Result};
pub use metrics::{IngestionMetrics, MetricsSnapshot};
pub use pipeline::IngestPipeline;
pub use reader::{LogReader, RawLogFile};
pub use scanner::LogScanner;
pub use telegram::TelegramParser;
