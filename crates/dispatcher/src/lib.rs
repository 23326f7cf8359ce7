//! # Dispatcher
//!
//! Sample fan-out module.
//!
//! Responsibilities:
//! - One worker task per sink with an isolated bounded queue
//! - Drop-on-full per sink; a slow or failing sink never stalls the others
//! - Per-sink write/failure/drop metrics

mod dispatcher;
mod error;
mod handle;
mod metrics;
pub mod sinks;

pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, LogSink, NetworkSink};
