//! # Carbon Insight
//!
//! Decision-support analytics for emissions reporting.
//!
//! The workspace is split into one crate per engine; this package re-exports them and
//! adds a combined configuration, a session bundling one instance of every engine and
//! a tracing initializer for binaries embedding the engines.
//!
//! - [`emission_forecast`]: candidate-model forecasting of daily emissions
//! - [`emission_anomaly`]: ensemble anomaly detection and data-quality scoring
//! - [`reduction_optimizer`]: budget-constrained initiative selection
//! - [`scenario_projector`]: multi-year scenario projection and feasibility
//!
//! ## Example
//!
//! ```no_run
//! use carbon_insight::{AnalyticsSession, EngineConfig, ObservationSeries};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! carbon_insight::init_tracing();
//!
//! let config = EngineConfig::from_path("engine.json")?;
//! let mut session = AnalyticsSession::new(config)?;
//!
//! let series = ObservationSeries::from_csv_path("emissions.csv")?;
//! let analysis = session.analyze_series(&series, 30)?;
//! println!("{} anomalies", analysis.anomalies.total_anomalies);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod config;
pub mod session;
pub mod telemetry;

pub use emission_anomaly;
pub use emission_core;
pub use emission_forecast;
pub use reduction_optimizer;
pub use scenario_projector;

// Re-export commonly used types
pub use config::EngineConfig;
pub use emission_anomaly::{AnomalyEnsemble, AnomalyReport, DataQualityReport, EnsembleConfig};
pub use emission_core::{ObservationSeries, RawObservation, Scope};
pub use emission_forecast::{ForecastResult, Forecaster, ForecasterConfig, TrainingSummary};
pub use reduction_optimizer::{
    CompanyProfile, Initiative, OptimizationReport, OptimizationResult, OptimizerConfig,
    RecommendationEngine, RecommendationReport, ReductionOptimizer,
};
pub use scenario_projector::{
    EmissionsProfile, Intervention, Scenario, ScenarioConfig, ScenarioProjector, TargetStrategy,
};
pub use session::{AnalyticsSession, SeriesAnalysis};
pub use telemetry::init_tracing;

/// Errors surfaced by the facade
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Series error: {0}")]
    Core(#[from] emission_core::CoreError),

    #[error("Forecast error: {0}")]
    Forecast(#[from] emission_forecast::ForecastError),

    #[error("Anomaly detection error: {0}")]
    Anomaly(#[from] emission_anomaly::AnomalyError),

    #[error("Optimization error: {0}")]
    Optimizer(#[from] reduction_optimizer::OptimizerError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] scenario_projector::ScenarioError),
}

/// Result type for facade operations
pub type Result<T> = std::result::Result<T, InsightError>;

/// Version of the carbon_insight crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
