//! Ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Telegrams decoded successfully
    pub telegrams_decoded: AtomicU64,

    /// Lines that failed to decode
    pub parse_errors: AtomicU64,

    /// Files fully ingested
    pub files_ingested: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decoded telegram
    pub fn record_telegram(&self) {
        self.telegrams_decoded.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("lidar_harvest_telegrams_decoded_total").increment(1);
    }

    /// Record a line parse failure
    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("lidar_harvest_telegram_parse_errors_total").increment(1);
    }

    /// Record a fully ingested file
    pub fn record_file(&self) {
        self.files_ingested.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("lidar_harvest_raw_files_ingested_total").increment(1);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            telegrams_decoded: self.telegrams_decoded.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            files_ingested: self.files_ingested.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    /// Telegrams decoded successfully
    pub telegrams_decoded: u64,

    /// Lines that failed to decode
    pub parse_errors: u64,

    /// Files fully ingested
    pub files_ingested: u64,
}
