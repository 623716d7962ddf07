//! # Emission Forecast
//!
//! Forecasting of daily emission totals by held-out model selection.
//!
//! ## Features
//!
//! - Three candidate families: feature regression, seasonal ARIMA, trend + seasonality
//! - Chronological hold-out scoring (MAE, RMSE, MAPE) and refit of the winner
//! - Point forecasts with a normal confidence band from in-sample residuals
//! - Serializable fitted state for caller-side persistence
//! - Descriptive trend and change-point analysis
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emission_core::ObservationSeries;
//! use emission_forecast::{Forecaster, ForecasterConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let series = ObservationSeries::from_csv_path("emissions.csv")?;
//!
//! let mut forecaster = Forecaster::new(ForecasterConfig::default());
//! let summary = forecaster.train(&series)?;
//! println!("selected {}", summary.model_used);
//!
//! let forecast = forecaster.predict(30)?;
//! println!("{:?}", forecast.predictions);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod trend;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecasterConfig;
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{CandidateScore, Forecaster, ForecasterState, TrainingSummary};
pub use crate::models::{
    ConfidenceInterval, FittedModel, ForecastModel, ForecastResult, TrainedForecastModel,
};
pub use crate::trend::{TrendAnalysis, TrendAnalyzer};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
