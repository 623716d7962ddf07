//! # Emission Anomaly
//!
//! `emission_anomaly` flags suspicious emission records with an ensemble of
//! independently fitted detectors and turns the outcome into a data-quality score.
//!
//! Detectors are organized by approach:
//!
//! - **Density**: isolation forest over the standardized feature table
//! - **Statistical**: z-scores and interquartile fences per measurement column
//! - **Temporal**: level shifts, trend breaks and seasonal deviations
//!
//! ## Usage Example
//!
//! ```no_run
//! use emission_anomaly::{AnomalyEnsemble, DataQualityReport, EnsembleConfig};
//! use emission_core::ObservationSeries;
//!
//! let history = ObservationSeries::from_csv_path("emissions.csv")?;
//! let mut ensemble = AnomalyEnsemble::new(EnsembleConfig::default())?;
//! ensemble.train_all(&history)?;
//!
//! let latest = ObservationSeries::from_csv_path("latest.csv")?;
//! let report = ensemble.detect(&latest)?;
//! let quality = DataQualityReport::from_detection(&report);
//! println!("{} anomalies, quality {:?}", report.total_anomalies, quality.quality_level);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use emission_core::CoreError;
use thiserror::Error;

pub mod config;
pub mod detectors;
pub mod ensemble;
pub mod features;
pub mod quality;

// Re-export commonly used types
pub use config::EnsembleConfig;
pub use detectors::{
    AnomalyDetector, DensityDetector, DetectionResult, StatisticalDetector, TemporalDetector,
};
pub use ensemble::{
    AnomalousRecord, AnomalyEnsemble, AnomalyReport, AnomalyVerdict, DetectorOutcome,
    EnsembleTrainingReport,
};
pub use features::{
    prepare_features, prepare_features_with_context, FeatureContext, FeatureTable,
    FEATURE_COLUMNS, MEASUREMENT_COLUMNS,
};
pub use quality::{DataQualityReport, QualityLevel};

/// Errors that can occur during anomaly detection
#[derive(Error, Debug)]
pub enum AnomalyError {
    #[error("Ensemble has not been trained")]
    NotTrained,

    #[error("Detector not fitted: {0}")]
    NotFitted(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Feature mismatch: {0}")]
    FeatureMismatch(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("All detectors failed: {0}")]
    AllDetectorsFailed(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for anomaly operations
pub type Result<T> = std::result::Result<T, AnomalyError>;

/// Version of the emission_anomaly crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
