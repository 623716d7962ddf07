//! Forecaster configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Z value of the default 95% confidence band
pub const DEFAULT_CONFIDENCE_Z: f64 = 1.96;

/// Tuning knobs for a [`Forecaster`](crate::Forecaster) run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterConfig {
    /// Dominant seasonal period in days; chosen from the data length when unset
    pub seasonal_period: Option<usize>,
    /// Fraction of the series held out for scoring candidates
    pub test_ratio: f64,
    /// Z multiplier for the confidence band
    pub confidence_z: f64,
    /// Largest autoregressive order searched
    pub max_ar_order: usize,
    /// Largest differencing order searched
    pub max_difference: usize,
    /// Largest moving-average order searched
    pub max_ma_order: usize,
    /// Upper bound on trend changepoints in the trend/seasonal model
    pub changepoints: usize,
    /// Ridge penalty on changepoint slope adjustments
    pub changepoint_penalty: f64,
    /// Ridge penalty on the feature-regression coefficients
    pub feature_ridge: f64,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            seasonal_period: None,
            test_ratio: 0.2,
            confidence_z: DEFAULT_CONFIDENCE_Z,
            max_ar_order: 2,
            max_difference: 1,
            max_ma_order: 2,
            changepoints: 25,
            changepoint_penalty: 10.0,
            feature_ridge: 1e-3,
        }
    }
}

impl ForecasterConfig {
    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if let Some(period) = self.seasonal_period {
            if period < 2 {
                return Err(ForecastError::InvalidParameter(format!(
                    "seasonal_period must be at least 2, got {}",
                    period
                )));
            }
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if !(self.confidence_z.is_finite() && self.confidence_z >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence_z must be a non-negative number, got {}",
                self.confidence_z
            )));
        }
        if self.max_difference > 2 {
            return Err(ForecastError::InvalidParameter(
                "max_difference above 2 is not supported".to_string(),
            ));
        }
        for (name, value) in [
            ("changepoint_penalty", self.changepoint_penalty),
            ("feature_ridge", self.feature_ridge),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Seasonal period for a daily series of the given length
    pub fn resolve_period(&self, daily_points: usize) -> usize {
        self.seasonal_period
            .unwrap_or(if daily_points >= 730 { 365 } else { 7 })
    }
}
