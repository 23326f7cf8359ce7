//! Per-file telegram reading
//!
//! Reads one raw log file line by line. A line that fails to decode is
//! logged and skipped (it costs one frame of input, not the batch); a file
//! that cannot be opened is the caller's error to handle.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use contracts::Measurement;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::metrics::IngestionMetrics;
use crate::telegram::TelegramParser;

/// Length of the wall-clock prefix on the first raw line
/// ("YYYY-MM-DD HH:MM:SS.mmm")
const CLOCK_PREFIX_LEN: usize = 23;

/// One ingested raw log file
#[derive(Debug)]
pub struct RawLogFile {
    /// Source path
    pub path: PathBuf,

    /// Decoded measurement rows, in line order
    pub measurements: Vec<Measurement>,

    /// Lines that failed to decode and were skipped
    pub skipped_lines: u64,

    /// Digits of the first line's wall-clock prefix, if present
    pub clock_digits: Option<String>,
}

/// Raw log file reader
pub struct LogReader {
    parser: TelegramParser,
    metrics: Arc<IngestionMetrics>,
}

impl LogReader {
    /// Create a reader
    pub fn new(parser: TelegramParser, metrics: Arc<IngestionMetrics>) -> Self {
        Self { parser, metrics }
    }

    /// Read and decode one raw log file
    ///
    /// # Errors
    /// Fails only when the file cannot be opened or read; decode failures are
    /// skipped per line.
    #[instrument(name = "ingest_read_file", skip(self), fields(file = %path.display()))]
    pub fn read_file(&self, path: &Path) -> Result<RawLogFile> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut measurements = Vec::new();
        let mut skipped_lines = 0u64;
        let mut clock_digits = None;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            if line_no == 0 {
                clock_digits = extract_clock_digits(&line);
            }

            match self.parser.parse_line(&line) {
                Ok(measurement) => {
                    self.metrics.record_telegram();
                    measurements.push(measurement);
                }
                Err(e) => {
                    self.metrics.record_parse_error();
                    skipped_lines += 1;
                    warn!(
                        file = %path.display(),
                        line = line_no + 1,
                        error = %e,
                        "could not parse line, skipping"
                    );
                }
            }
        }

        debug!(
            file = %path.display(),
            rows = measurements.len(),
            skipped = skipped_lines,
            "file ingested"
        );

        Ok(RawLogFile {
            path: path.to_path_buf(),
            measurements,
            skipped_lines,
            clock_digits,
        })
    }
}

/// Digits of the leading wall-clock prefix, when the line carries one
fn extract_clock_digits(line: &str) -> Option<String> {
    let prefix: String = line
        .chars()
        .take(CLOCK_PREFIX_LEN)
        .filter(|c| c.is_ascii_digit())
        .collect();

    // A full date+time yields at least 14 digits
    if prefix.len() >= 14 {
        Some(prefix)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TelegramConfig;
    use std::fs;
    use tempfile::tempdir;

    fn encode_line(prefix: &str, telegram: &str) -> String {
        let hex: String = telegram.bytes().map(|b| format!("{b:02X}")).collect();
        format!("{prefix}<{hex}>")
    }

    fn test_reader() -> LogReader {
        let config = TelegramConfig {
            expected_fields: 7,
            header_fields: 3,
            trailer_fields: 2,
        };
        LogReader::new(
            TelegramParser::new(config),
            Arc::new(IngestionMetrics::new()),
        )
    }

    #[test]
    fn test_read_file_skips_bad_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_data_1.log");

        let good = encode_line("2019-06-12 13:45:01.123 ", "sSN LMDscandata 2 A B 0 0");
        let content = format!("{good}\ngarbage line\n{good}\n");
        fs::write(&path, content).unwrap();

        let reader = test_reader();
        let result = reader.read_file(&path).unwrap();

        assert_eq!(result.measurements.len(), 2);
        assert_eq!(result.skipped_lines, 1);
        assert_eq!(result.measurements[0].values, vec![0xA, 0xB]);
        assert_eq!(result.clock_digits.as_deref(), Some("20190612134501123"));
    }

    #[test]
    fn test_clock_digits_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_data_1.log");
        fs::write(&path, encode_line("", "sSN LMDscandata 1 A 0 0")).unwrap();

        let reader = test_reader();
        let result = reader.read_file(&path).unwrap();
        assert!(result.clock_digits.is_none());
        assert_eq!(result.measurements.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let reader = test_reader();
        assert!(reader.read_file(Path::new("/nonexistent/file.log")).is_err());
    }

    #[test]
    fn test_extract_clock_digits() {
        assert_eq!(
            extract_clock_digits("2019-06-12 13:45:01.123 <AA>").as_deref(),
            Some("20190612134501123")
        );
        assert_eq!(extract_clock_digits("<AA>"), None);
        assert_eq!(extract_clock_digits("12:45 <AA>"), None);
    }
}
