//! Regression on derived lag, rolling and calendar features

use crate::error::{ForecastError, Result};
use crate::features::{feature_table, feature_vector, FEATURE_NAMES, MAX_LAG};
use crate::models::{residual_std, FittedModel, ForecastModel, TrainedForecastModel};
use chrono::{DateTime, Duration, Utc};
use emission_core::regression::{dot, least_squares, StandardScaler};
use emission_core::ObservationSeries;
use serde::{Deserialize, Serialize};

pub const MODEL_NAME: &str = "linear_features";

/// Least-squares regression on standardized derived features
#[derive(Debug, Clone)]
pub struct LinearFeaturesModel {
    ridge: f64,
}

/// Fitted feature regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFeaturesFit {
    /// Intercept followed by one coefficient per feature
    coefficients: Vec<f64>,
    scaler: StandardScaler,
    /// Last values of the fitted history, enough to derive every lag
    tail: Vec<f64>,
    last_timestamp: DateTime<Utc>,
    residual_std: f64,
}

impl LinearFeaturesModel {
    /// Create a new feature regression with the given ridge penalty
    pub fn new(ridge: f64) -> Self {
        Self { ridge }
    }
}

impl ForecastModel for LinearFeaturesModel {
    fn fit(&self, series: &ObservationSeries) -> Result<FittedModel> {
        let values = series.values();
        let timestamps = series.timestamps();

        let min_points = MAX_LAG + FEATURE_NAMES.len() + 2;
        if values.len() < min_points {
            return Err(ForecastError::ForecastingError(format!(
                "{} needs at least {} points, got {}",
                MODEL_NAME,
                min_points,
                values.len()
            )));
        }

        let (rows, targets) = feature_table(&values, &timestamps);
        let scaler = StandardScaler::fit(&rows)?;

        // Intercept column plus standardized features
        let design: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| {
                let mut scaled = Vec::with_capacity(row.len() + 1);
                scaled.push(1.0);
                scaled.extend(scaler.transform_row(row));
                scaled
            })
            .collect();
        let mut penalties = vec![self.ridge; FEATURE_NAMES.len() + 1];
        penalties[0] = 0.0;

        let coefficients = least_squares(&design, &targets, &penalties)?;

        let fitted: Vec<f64> = design.iter().map(|row| dot(row, &coefficients)).collect();
        let residual_std = residual_std(&targets, &fitted);

        let last_timestamp = series
            .last_timestamp()
            .ok_or_else(|| ForecastError::ForecastingError("Empty series".to_string()))?;

        Ok(FittedModel::LinearFeatures(LinearFeaturesFit {
            coefficients,
            scaler,
            tail: values[values.len() - MAX_LAG..].to_vec(),
            last_timestamp,
            residual_std,
        }))
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

impl TrainedForecastModel for LinearFeaturesFit {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let mut history = self.tail.clone();
        let mut forecasts = Vec::with_capacity(horizon);

        for step in 1..=horizon {
            let timestamp = self.last_timestamp + Duration::days(step as i64);
            let row = feature_vector(&history, &timestamp).ok_or_else(|| {
                ForecastError::ForecastingError("Feature history is too short".to_string())
            })?;

            let scaled = self.scaler.transform_row(&row);
            let prediction = self.coefficients[0] + dot(&self.coefficients[1..], &scaled);

            // Feed the prediction back as history for the next step
            history.push(prediction);
            forecasts.push(prediction);
        }

        Ok(forecasts)
    }

    fn residual_std(&self) -> f64 {
        self.residual_std
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}
