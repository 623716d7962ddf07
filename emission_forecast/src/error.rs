//! Error types for the emission_forecast crate

use emission_core::CoreError;
use thiserror::Error;

/// Custom error types for the emission_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series is too short for the seasonal period in use
    #[error("Insufficient data: need at least {required} daily points, have {available}")]
    DataInsufficient { required: usize, available: usize },

    /// Every candidate model failed to fit
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// Prediction requested before a successful training run
    #[error("Forecaster has not been trained")]
    NotTrained,

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to forecasting operations
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Error related to accuracy evaluation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from series handling or numerical routines
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Error from state (de)serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
