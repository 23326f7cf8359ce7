//! Raw log file discovery
//!
//! Accepts `<stem>.log` and `<stem>_<digits>.log`, warns once per misnamed
//! entry, and skips files still inside the settle window so the sensor can
//! finish writing them.

use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use contracts::IngestConfig;
use tracing::{debug, warn};

/// Raw directory scanner with explicit bookkeeping state
pub struct LogScanner {
    raw_dir: PathBuf,
    file_stem: String,
    settle: Duration,
    /// Names already warned about, so one stray file does not flood the log
    flagged_names: HashSet<OsString>,
}

impl LogScanner {
    /// Create a scanner from ingest settings
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            raw_dir: config.raw_dir.clone(),
            file_stem: config.file_stem.clone(),
            settle: Duration::from_secs(config.settle_secs),
            flagged_names: HashSet::new(),
        }
    }

    /// List settled raw files in sorted (temporal) order
    ///
    /// # Errors
    /// Fails only when the raw directory itself cannot be listed; individual
    /// unreadable entries are skipped with a warning.
    pub fn scan(&mut self) -> io::Result<Vec<PathBuf>> {
        let mut accepted = Vec::new();

        for entry in std::fs::read_dir(&self.raw_dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "unreadable directory entry, skipping");
                    continue;
                }
            };

            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if !self.accepts_name(&name_str) {
                if self.flagged_names.insert(name.clone()) {
                    warn!(
                        file = %name_str,
                        "raw file name may be incorrectly formatted"
                    );
                }
                continue;
            }

            if !self.is_settled(&path) {
                debug!(file = %name_str, "file inside settle window, deferred");
                continue;
            }

            accepted.push(path);
        }

        // Sorted order keeps measurements temporally ordered across files
        accepted.sort();
        Ok(accepted)
    }

    /// Filename grammar check
    fn accepts_name(&self, name: &str) -> bool {
        let Some(stem) = name.strip_suffix(".log") else {
            return false;
        };

        if stem == self.file_stem {
            return true;
        }

        match stem.strip_prefix(&self.file_stem) {
            Some(rest) => match rest.strip_prefix('_') {
                Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
                None => false,
            },
            None => false,
        }
    }

    /// True when the file's mtime is older than the settle window
    fn is_settled(&self, path: &Path) -> bool {
        if self.settle.is_zero() {
            return true;
        }

        match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => match modified.elapsed() {
                Ok(age) => age >= self.settle,
                // Clock skew puts mtime in the future; treat as not settled
                Err(_) => false,
            },
            Err(e) => {
                warn!(file = %path.display(), error = %e, "cannot stat file, deferred");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn scanner_for(dir: &Path, settle_secs: u64) -> LogScanner {
        LogScanner::new(&IngestConfig {
            raw_dir: dir.to_path_buf(),
            archive_dir: dir.join("archive"),
            file_stem: "raw_data".into(),
            settle_secs,
            delete_consumed: false,
        })
    }

    #[test]
    fn test_name_grammar() {
        let dir = tempdir().unwrap();
        let scanner = scanner_for(dir.path(), 0);

        assert!(scanner.accepts_name("raw_data.log"));
        assert!(scanner.accepts_name("raw_data_0.log"));
        assert!(scanner.accepts_name("raw_data_042.log"));
        assert!(!scanner.accepts_name("raw_data_.log"));
        assert!(!scanner.accepts_name("raw_data_12a.log"));
        assert!(!scanner.accepts_name("raw_data.txt"));
        assert!(!scanner.accepts_name("other.log"));
        assert!(!scanner.accepts_name("raw_dataX.log"));
    }

    #[test]
    fn test_scan_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("raw_data_2.log"), "b").unwrap();
        fs::write(dir.path().join("raw_data_1.log"), "a").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let mut scanner = scanner_for(dir.path(), 0);
        let files = scanner.scan().unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["raw_data_1.log", "raw_data_2.log"]);
    }

    #[test]
    fn test_settle_window_defers_fresh_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("raw_data_1.log"), "a").unwrap();

        // One hour settle window: the file was just written
        let mut scanner = scanner_for(dir.path(), 3600);
        let files = scanner.scan().unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_warn_once_bookkeeping() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bogus.log"), "x").unwrap();

        let mut scanner = scanner_for(dir.path(), 0);
        scanner.scan().unwrap();
        assert_eq!(scanner.flagged_names.len(), 1);

        // Second scan must not grow the set
        scanner.scan().unwrap();
        assert_eq!(scanner.flagged_names.len(), 1);
    }
}
