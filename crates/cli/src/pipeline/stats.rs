//! Stage statistics.

use std::time::Duration;

use observability::ExtractionAggregator;

/// Statistics from compression passes
#[derive(Debug, Clone, Default)]
pub struct CompressStats {
    /// Archival blocks written
    pub blocks_written: u64,

    /// Raw files consumed into blocks
    pub files_consumed: u64,

    /// Raw files deleted after archiving
    pub files_deleted: u64,

    /// Measurement rows archived
    pub rows_archived: u64,

    /// Telegram lines skipped as unparseable
    pub lines_skipped: u64,

    /// Total duration of the passes
    pub duration: Duration,
}

impl CompressStats {
    /// Fold another pass into this total
    pub fn merge(&mut self, other: &CompressStats) {
        self.blocks_written += other.blocks_written;
        self.files_consumed += other.files_consumed;
        self.files_deleted += other.files_deleted;
        self.rows_archived += other.rows_archived;
        self.lines_skipped += other.lines_skipped;
        self.duration += other.duration;
    }

    /// Share of lines that failed to parse, as percentage
    pub fn skip_rate(&self) -> f64 {
        let total = self.rows_archived + self.lines_skipped;
        if total > 0 {
            (self.lines_skipped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Compression Statistics ===");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Blocks written: {}", self.blocks_written);
        println!(
            "  Raw files consumed: {} ({} deleted)",
            self.files_consumed, self.files_deleted
        );
        println!("  Rows archived: {}", self.rows_archived);
        println!(
            "  Lines skipped: {} ({:.2}%)",
            self.lines_skipped,
            self.skip_rate()
        );
        println!();
    }
}

/// Statistics from an extraction run
#[derive(Debug, Clone, Default)]
pub struct ExtractStats {
    /// Blocks processed
    pub blocks_processed: u64,

    /// Samples handed to the dispatcher
    pub samples_dispatched: u64,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Total duration of the run
    pub duration: Duration,

    /// Extraction metrics aggregator
    pub extraction: ExtractionAggregator,
}

impl ExtractStats {
    /// Blocks per second throughput
    pub fn blocks_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.blocks_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Extraction Statistics ===");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!(
            "  Blocks processed: {} ({:.2}/s)",
            self.blocks_processed,
            self.blocks_per_sec()
        );
        println!("  Samples dispatched: {}", self.samples_dispatched);
        println!("  Active sinks: {}", self.active_sinks);
        println!();
        print!("{}", self.extraction.summary());
        println!();
    }
}
