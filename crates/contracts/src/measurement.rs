//! Measurement & MeasurementBlock - Ingestion output
//!
//! Raw decoded sensor rows, positional time model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Archival batch identifier with cheap cloning.
///
/// The digits of the first raw line's wall-clock prefix (`YYYYMMDDHHMMSS...`).
/// Uses `Arc<str>` internally so the id can be stamped onto every span and
/// sample without re-allocating.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BatchId(Arc<str>);

impl BatchId {
    /// Create a new BatchId from a string slice.
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id looks like a wall-clock stamp (digits only, at least
    /// a full `YYYYMMDDHHMMSS`).
    pub fn is_clock_stamp(&self) -> bool {
        self.0.len() >= 14 && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl From<&str> for BatchId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for BatchId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatchId({:?})", self.0)
    }
}

impl PartialEq<str> for BatchId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for BatchId {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for BatchId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BatchId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

/// One time step's worth of raw sensor readings.
///
/// Values are the decoded base-16 data points of a single telegram, in beam
/// order. Single-beam sensors produce rows of width 1; scanning sensors one
/// value per beam angle. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Raw range/intensity values, one per beam
    pub values: Vec<u32>,
}

impl Measurement {
    /// Create a measurement from decoded data points
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }

    /// Number of beams in this row
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// True for a zero-beam row (rejected upstream, but representable)
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One archival batch of measurements.
///
/// The temporal axis is the row index, earliest first. Read-only input to the
/// extraction stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementBlock {
    /// Batch identifier (wall-clock stamp)
    pub batch_id: BatchId,

    /// Ordered measurement rows
    pub measurements: Vec<Measurement>,
}

impl MeasurementBlock {
    /// Create a block
    pub fn new(batch_id: BatchId, measurements: Vec<Measurement>) -> Self {
        Self {
            batch_id,
            measurements,
        }
    }

    /// Number of rows (time steps)
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// True when the block holds no rows
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Beam count of the first row, if any
    pub fn width(&self) -> Option<usize> {
        self.measurements.first().map(Measurement::width)
    }

    /// True when every row has the same beam count
    pub fn is_rectangular(&self) -> bool {
        match self.width() {
            Some(w) => self.measurements.iter().all(|m| m.width() == w),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_clone_is_cheap() {
        let id = BatchId::new("20190612134501123");
        let id2 = id.clone();
        assert_eq!(id.as_str().as_ptr(), id2.as_str().as_ptr());
    }

    #[test]
    fn test_batch_id_clock_stamp() {
        assert!(BatchId::new("20190612134501").is_clock_stamp());
        assert!(BatchId::new("20190612134501123").is_clock_stamp());
        assert!(!BatchId::new("2019-06-12").is_clock_stamp());
        assert!(!BatchId::new("unknown").is_clock_stamp());
    }

    #[test]
    fn test_batch_id_serde() {
        let id = BatchId::new("20190612134501");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"20190612134501\"");
        let parsed: BatchId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_block_rectangular() {
        let block = MeasurementBlock::new(
            "1".into(),
            vec![
                Measurement::new(vec![1, 2, 3]),
                Measurement::new(vec![4, 5, 6]),
            ],
        );
        assert!(block.is_rectangular());
        assert_eq!(block.width(), Some(3));

        let ragged = MeasurementBlock::new(
            "2".into(),
            vec![Measurement::new(vec![1, 2, 3]), Measurement::new(vec![4])],
        );
        assert!(!ragged.is_rectangular());
    }

    #[test]
    fn test_empty_block() {
        let block = MeasurementBlock::new("3".into(), vec![]);
        assert!(block.is_empty());
        assert!(block.is_rectangular());
        assert_eq!(block.width(), None);
    }
}
