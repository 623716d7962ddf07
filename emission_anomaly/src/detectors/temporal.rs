//! Time-series detector: level shifts, trend breaks and seasonal deviations

use super::{AnomalyDetector, DetectionResult};
use crate::config::EnsembleConfig;
use crate::features::FeatureTable;
use crate::{AnomalyError, Result};
use chrono::Datelike;
use emission_core::rolling::{rolling_mean, rolling_slope, rolling_std};
use emission_core::stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean and spread of one calendar month in the training data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthProfile {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TemporalState {
    /// Standard deviation of training rolling slopes, absent with too few slopes
    slope_std: Option<f64>,
    months: BTreeMap<u32, MonthProfile>,
}

/// Flags records breaking the local level, the local trend or the monthly pattern
///
/// The score of a record is the number of checks it fails (0 to 3).
#[derive(Debug, Clone)]
pub struct TemporalDetector {
    level_window: usize,
    level_sigma: f64,
    trend_window: usize,
    seasonal_sigma: f64,
    state: Option<TemporalState>,
}

impl TemporalDetector {
    /// Create a new temporal detector
    pub fn new(
        level_window: usize,
        level_sigma: f64,
        trend_window: usize,
        seasonal_sigma: f64,
    ) -> Result<Self> {
        if level_window < 2 || trend_window < 2 {
            return Err(AnomalyError::InvalidParameter(
                "rolling windows must span at least 2 records".to_string(),
            ));
        }
        if !(level_sigma > 0.0 && seasonal_sigma > 0.0) {
            return Err(AnomalyError::InvalidParameter(
                "sigma multipliers must be positive".to_string(),
            ));
        }
        Ok(Self {
            level_window,
            level_sigma,
            trend_window,
            seasonal_sigma,
            state: None,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &EnsembleConfig) -> Result<Self> {
        Self::new(
            config.level_window,
            config.level_sigma,
            config.trend_window,
            config.seasonal_sigma,
        )
    }

    /// Training profile of each calendar month with at least two records
    pub fn month_profiles(&self) -> Option<&BTreeMap<u32, MonthProfile>> {
        self.state.as_ref().map(|s| &s.months)
    }

    fn level_shifts(&self, values: &[f64]) -> Vec<bool> {
        let means = rolling_mean(values, self.level_window);
        let stds = rolling_std(values, self.level_window);
        values
            .iter()
            .zip(means.iter().zip(&stds))
            .map(|(x, window)| match window {
                (Some(mean), Some(std)) => (x - mean).abs() > self.level_sigma * std,
                _ => false,
            })
            .collect()
    }

    fn trend_breaks(&self, values: &[f64], slope_std: Option<f64>) -> Vec<bool> {
        let mut flags = vec![false; values.len()];
        let Some(threshold) = slope_std else {
            return flags;
        };

        let slopes = rolling_slope(values, self.trend_window);
        for i in 1..slopes.len() {
            if let (Some(previous), Some(current)) = (slopes[i - 1], slopes[i]) {
                flags[i] = (current - previous).abs() > threshold;
            }
        }
        flags
    }
}

impl Default for TemporalDetector {
    fn default() -> Self {
        Self {
            level_window: 30,
            level_sigma: 2.0,
            trend_window: 14,
            seasonal_sigma: 2.0,
            state: None,
        }
    }
}

impl AnomalyDetector for TemporalDetector {
    fn name(&self) -> &str {
        "time_series"
    }

    fn fit(&mut self, table: &FeatureTable) -> Result<()> {
        if table.len() < 2 {
            return Err(AnomalyError::InsufficientData(format!(
                "temporal detector needs at least 2 records, got {}",
                table.len()
            )));
        }

        let values = table.values();
        let slopes: Vec<f64> = rolling_slope(values, self.trend_window)
            .into_iter()
            .flatten()
            .collect();
        let slope_std = (slopes.len() >= 2).then(|| stats::sample_std(&slopes));

        let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (value, ts) in values.iter().zip(table.timestamps()) {
            by_month.entry(ts.month()).or_default().push(*value);
        }
        let months = by_month
            .into_iter()
            .filter(|(_, vals)| vals.len() >= 2)
            .map(|(month, vals)| {
                (
                    month,
                    MonthProfile {
                        mean: stats::mean(&vals),
                        std: stats::sample_std(&vals),
                    },
                )
            })
            .collect();

        self.state = Some(TemporalState { slope_std, months });
        Ok(())
    }

    fn detect(&self, table: &FeatureTable) -> Result<DetectionResult> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| AnomalyError::NotFitted(self.name().to_string()))?;

        let values = table.values();
        let level = self.level_shifts(values);
        let trend = self.trend_breaks(values, state.slope_std);
        let seasonal: Vec<bool> = values
            .iter()
            .zip(table.timestamps())
            .map(|(x, ts)| {
                state.months.get(&ts.month()).map_or(false, |profile| {
                    (x - profile.mean).abs() > self.seasonal_sigma * profile.std
                })
            })
            .collect();

        let scores: Vec<f64> = (0..values.len())
            .map(|i| [level[i], trend[i], seasonal[i]].iter().filter(|&&f| f).count() as f64)
            .collect();
        let is_anomaly = scores.iter().map(|&s| s >= 1.0).collect();

        Ok(DetectionResult::new(is_anomaly, scores, 1.0))
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}
