//! Occupancy detector implementations
//!
//! A vehicle under the beam reads closer than the empty-road background, so
//! both detectors compare raw ranges against a configured threshold. Which
//! statistic they compare differs by sensor modality.

use contracts::{BoxedDetector, DetectorConfig, HarvestError, Measurement, OccupancyDetector};

/// Build the configured detector
pub fn build_detector(config: &DetectorConfig) -> BoxedDetector {
    match *config {
        DetectorConfig::SingleBeam { range_threshold } => {
            Box::new(SingleBeamDetector::new(range_threshold))
        }
        DetectorConfig::Scanning {
            range_threshold,
            min_beams,
        } => Box::new(ScanningDetector::new(range_threshold, min_beams)),
    }
}

/// Single-beam occupancy: mean range below the threshold
#[derive(Debug, Clone, Copy)]
pub struct SingleBeamDetector {
    range_threshold: u32,
}

impl SingleBeamDetector {
    /// Create a detector with the given range threshold (raw sensor units)
    pub fn new(range_threshold: u32) -> Self {
        Self { range_threshold }
    }
}

impl OccupancyDetector for SingleBeamDetector {
    fn detect(&mut self, measurement: &Measurement) -> Result<bool, HarvestError> {
        if measurement.is_empty() {
            return Err(HarvestError::Other("empty measurement row".into()));
        }

        let sum: u64 = measurement.values.iter().map(|&v| u64::from(v)).sum();
        let mean = sum / measurement.values.len() as u64;
        Ok(mean < u64::from(self.range_threshold))
    }
}

/// Scanning occupancy: at least `min_beams` beams below the threshold
#[derive(Debug, Clone, Copy)]
pub struct ScanningDetector {
    range_threshold: u32,
    min_beams: usize,
}

impl ScanningDetector {
    /// Create a detector with the given range threshold and beam quorum
    pub fn new(range_threshold: u32, min_beams: usize) -> Self {
        Self {
            range_threshold,
            min_beams,
        }
    }
}

impl OccupancyDetector for ScanningDetector {
    fn detect(&mut self, measurement: &Measurement) -> Result<bool, HarvestError> {
        if measurement.is_empty() {
            return Err(HarvestError::Other("empty measurement row".into()));
        }

        let near = measurement
            .values
            .iter()
            .filter(|&&v| v < self.range_threshold)
            .count();
        Ok(near >= self.min_beams)
    }
}
