//! Candidate forecasting models
//!
//! Every candidate family implements [`ForecastModel`]: it fits a daily series and
//! returns a [`FittedModel`], the tagged union of all fitted artifacts. Fitted models
//! extrapolate through [`TrainedForecastModel`].

use crate::error::Result;
use chrono::NaiveDate;
use emission_core::ObservationSeries;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod linear_features;
pub mod seasonal_arima;
pub mod trend_seasonal;

pub use linear_features::{LinearFeaturesFit, LinearFeaturesModel};
pub use seasonal_arima::{SeasonalArimaFit, SeasonalArimaModel};
pub use trend_seasonal::{TrendSeasonalFit, TrendSeasonalModel};

/// Symmetric confidence band around point predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub confidence_level: f64,
}

/// Forecast produced by the selected model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Point predictions, one per future day
    pub predictions: Vec<f64>,
    /// Calendar days the predictions refer to
    pub dates: Vec<NaiveDate>,
    /// Name of the model that produced the forecast
    pub model_used: String,
    pub confidence_interval: ConfidenceInterval,
}

impl ForecastResult {
    /// Number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.predictions.len()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate point forecasts for the days following the fitted history
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Standard deviation of in-sample residuals
    fn residual_std(&self) -> f64;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted on a daily series
pub trait ForecastModel: Debug {
    /// Fit the model and return its fitted artifact
    fn fit(&self, series: &ObservationSeries) -> Result<FittedModel>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Fitted artifact of any candidate family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum FittedModel {
    LinearFeatures(LinearFeaturesFit),
    SeasonalArima(SeasonalArimaFit),
    TrendSeasonal(TrendSeasonalFit),
}

impl FittedModel {
    fn inner(&self) -> &dyn TrainedForecastModel {
        match self {
            FittedModel::LinearFeatures(fit) => fit,
            FittedModel::SeasonalArima(fit) => fit,
            FittedModel::TrendSeasonal(fit) => fit,
        }
    }
}

impl TrainedForecastModel for FittedModel {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        self.inner().forecast(horizon)
    }

    fn residual_std(&self) -> f64 {
        self.inner().residual_std()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

/// Standard deviation of residuals, 0 when undefined
pub(crate) fn residual_std(actual: &[f64], fitted: &[f64]) -> f64 {
    let residuals: Vec<f64> = actual.iter().zip(fitted).map(|(a, f)| a - f).collect();
    emission_core::stats::sample_std(&residuals)
}
