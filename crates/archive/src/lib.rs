//! # Archive
//!
//! Timestamped archival block store.
//!
//! Responsibilities:
//! - Name each block from the wall clock of its first raw line
//! - Write bincode block files with JSON sidecar metadata
//! - Enumerate and decode blocks for the extraction stage
//!
//! Layout under the archive directory:
//!
//! ```text
//! compressed_data/
//!     20190612134501123.bin        # bincode MeasurementBlock
//!     20190612134501123.meta.json  # BlockMeta sidecar
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ArchiveError, Result};
pub use reader::ArchiveReader;
pub use writer::{derive_batch_id, ArchiveWriter, BlockMeta};
