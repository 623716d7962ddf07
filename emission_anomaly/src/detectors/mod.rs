//! Anomaly detectors
//!
//! - **density**: isolation forest over standardized features
//! - **statistical**: per-measurement z-score and IQR fences
//! - **temporal**: level shifts, trend breaks and seasonal deviations

use crate::features::FeatureTable;
use crate::Result;
use serde::{Deserialize, Serialize};

pub mod isolation_forest;
pub mod statistical;
pub mod temporal;

pub use isolation_forest::DensityDetector;
pub use statistical::StatisticalDetector;
pub use temporal::TemporalDetector;

/// Per-record output of one detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Boolean mask indicating anomalies
    pub is_anomaly: Vec<bool>,
    /// Anomaly score per record, higher is more anomalous
    pub scores: Vec<f64>,
    /// Score threshold used for the binary call
    pub threshold: f64,
}

impl DetectionResult {
    /// Create a new detection result
    pub fn new(is_anomaly: Vec<bool>, scores: Vec<f64>, threshold: f64) -> Self {
        Self {
            is_anomaly,
            scores,
            threshold,
        }
    }

    /// Get indices of detected anomalies
    pub fn anomaly_indices(&self) -> Vec<usize> {
        self.is_anomaly
            .iter()
            .enumerate()
            .filter_map(|(i, &flagged)| if flagged { Some(i) } else { None })
            .collect()
    }

    /// Count of detected anomalies
    pub fn anomaly_count(&self) -> usize {
        self.is_anomaly.iter().filter(|&&x| x).count()
    }

    /// Share of records flagged
    pub fn anomaly_rate(&self) -> f64 {
        emission_core::stats::safe_ratio(self.anomaly_count() as f64, self.is_anomaly.len() as f64)
    }
}

/// Anomaly detector fitted on a feature table
///
/// Fitting replaces any previous state; detection only reads it.
pub trait AnomalyDetector: Send + Sync {
    /// Method name reported in verdicts
    fn name(&self) -> &str;

    /// Fit the detector to training features
    fn fit(&mut self, table: &FeatureTable) -> Result<()>;

    /// Detect anomalies using the fitted state
    fn detect(&self, table: &FeatureTable) -> Result<DetectionResult>;

    /// Check if detector has been fitted
    fn is_fitted(&self) -> bool;
}
