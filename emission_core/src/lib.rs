//! # Emission Core
//!
//! Shared building blocks for the emission analytics crates:
//!
//! - [`series`]: normalized observation series, CSV ingestion and daily aggregation
//! - [`calendar`]: calendar features derived from timestamps
//! - [`stats`]: descriptive statistics with NaN-free edge cases
//! - [`rolling`]: rolling-window means, deviations and slopes
//! - [`regression`]: simple trend lines, penalised least squares and feature scaling

use thiserror::Error;

pub mod calendar;
pub mod regression;
pub mod rolling;
pub mod series;
pub mod stats;

pub use calendar::CalendarFeatures;
pub use series::{Observation, ObservationSeries, RawObservation, Scope};

/// Errors raised while building series or running numerical routines
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Observation series is empty")]
    EmptySeries,

    #[error("Observation series has no numeric values")]
    NoValues,

    #[error("Malformed timestamp '{0}'")]
    MalformedTimestamp(String),

    #[error("Unknown scope '{0}'")]
    UnknownScope(String),

    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
