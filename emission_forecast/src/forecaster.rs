//! Candidate selection and forecasting engine
//!
//! A [`Forecaster`] owns its fitted state. Training reduces the input to daily totals,
//! checks there are at least two seasonal cycles, scores every registered candidate on a
//! chronological hold-out, then refits the winner on the full history.

use crate::config::ForecasterConfig;
use crate::error::{ForecastError, Result};
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use crate::models::{
    ConfidenceInterval, FittedModel, ForecastModel, ForecastResult, LinearFeaturesModel,
    SeasonalArimaModel, TrainedForecastModel, TrendSeasonalModel,
};
use crate::utils::{future_dates, train_test_split_index};
use chrono::{DateTime, Utc};
use emission_core::{stats, ObservationSeries};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info, warn};

/// Hold-out outcome of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub name: String,
    pub success: bool,
    /// Hold-out accuracy, present on success
    pub accuracy: Option<ForecastAccuracy>,
    /// Failure reason, present on failure
    pub error: Option<String>,
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Name of the selected model
    pub model_used: String,
    pub seasonal_period: usize,
    pub train_size: usize,
    pub test_size: usize,
    /// In-sample residual standard deviation of the refitted best model
    pub residual_std: f64,
    /// Every candidate in registry order
    pub candidates: Vec<CandidateScore>,
}

/// Persistable fitted state of a trained forecaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecasterState {
    pub model: FittedModel,
    pub last_timestamp: DateTime<Utc>,
    pub summary: TrainingSummary,
}

/// Forecasting engine selecting the best of several candidate families
#[derive(Debug, Clone)]
pub struct Forecaster {
    config: ForecasterConfig,
    state: Option<ForecasterState>,
}

impl Forecaster {
    /// Create a new untrained forecaster
    pub fn new(config: ForecasterConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Restore a forecaster from state produced by [`Forecaster::export_state`]
    pub fn from_state(config: ForecasterConfig, state_json: &str) -> Result<Self> {
        config.validate()?;
        let state: ForecasterState = serde_json::from_str(state_json)?;
        Ok(Self {
            config,
            state: Some(state),
        })
    }

    /// Serialize the fitted state to JSON
    pub fn export_state(&self) -> Result<String> {
        let state = self.state.as_ref().ok_or(ForecastError::NotTrained)?;
        Ok(serde_json::to_string(state)?)
    }

    /// Candidate families evaluated for the given seasonal period
    pub fn candidate_registry(&self, period: usize) -> Vec<Box<dyn ForecastModel>> {
        vec![
            Box::new(LinearFeaturesModel::new(self.config.feature_ridge)),
            Box::new(SeasonalArimaModel::new(
                period,
                self.config.max_ar_order,
                self.config.max_difference,
                self.config.max_ma_order,
            )),
            Box::new(TrendSeasonalModel::new(
                self.config.changepoints,
                self.config.changepoint_penalty,
            )),
        ]
    }

    /// Fit every candidate, select the best by hold-out MAE and retain it
    pub fn train(&mut self, series: &ObservationSeries) -> Result<TrainingSummary> {
        self.config.validate()?;

        let daily = series.daily_totals();
        let n = daily.len();
        let period = self.config.resolve_period(n);

        // Rejected before any candidate is touched
        let required = 2 * period;
        if n < required {
            return Err(ForecastError::DataInsufficient {
                required,
                available: n,
            });
        }

        let split = train_test_split_index(n, self.config.test_ratio);
        let train = daily.slice(0, split)?;
        let values = daily.values();
        let test = &values[split..];

        info!(
            points = n,
            seasonal_period = period,
            train_size = split,
            test_size = test.len(),
            "Training forecaster"
        );

        let registry = self.candidate_registry(period);
        let outcomes: Vec<(String, Result<ForecastAccuracy>)> = registry
            .iter()
            .map(|candidate| {
                let outcome = evaluate_candidate(candidate.as_ref(), &train, test);
                (candidate.name().to_string(), outcome)
            })
            .collect();

        let mut candidates = Vec::with_capacity(outcomes.len());
        let mut ranked: Vec<(usize, f64)> = Vec::new();
        for (index, (name, outcome)) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(accuracy) => {
                    info!(model = %name, accuracy = %accuracy, "Candidate scored");
                    ranked.push((index, accuracy.mae));
                    candidates.push(CandidateScore {
                        name,
                        success: true,
                        accuracy: Some(accuracy),
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(model = %name, seasonal_period = period, error = %err, "Candidate failed");
                    candidates.push(CandidateScore {
                        name,
                        success: false,
                        accuracy: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        if ranked.is_empty() {
            return Err(ForecastError::TrainingFailed(format!(
                "all {} candidate models failed",
                candidates.len()
            )));
        }
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        // Refit the best candidate on the full history, falling back to the runner-up
        for (index, mae) in ranked {
            let candidate = &registry[index];
            match candidate.fit(&daily) {
                Ok(model) => {
                    let last_timestamp = daily.last_timestamp().ok_or_else(|| {
                        ForecastError::TrainingFailed("daily series is empty".to_string())
                    })?;
                    let summary = TrainingSummary {
                        model_used: candidate.name().to_string(),
                        seasonal_period: period,
                        train_size: split,
                        test_size: test.len(),
                        residual_std: stats::finite_or_zero(model.residual_std()).max(0.0),
                        candidates,
                    };
                    info!(model = %summary.model_used, mae, "Selected forecasting model");

                    self.state = Some(ForecasterState {
                        model,
                        last_timestamp,
                        summary: summary.clone(),
                    });
                    return Ok(summary);
                }
                Err(err) => {
                    warn!(model = candidate.name(), error = %err, "Refit on full history failed");
                }
            }
        }

        Err(ForecastError::TrainingFailed(
            "no candidate could be refitted on the full history".to_string(),
        ))
    }

    /// Forecast `steps` days after the last observation with the selected model
    pub fn predict(&self, steps: usize) -> Result<ForecastResult> {
        if steps == 0 {
            return Err(ForecastError::InvalidParameter(
                "steps must be greater than zero".to_string(),
            ));
        }
        let state = self.state.as_ref().ok_or(ForecastError::NotTrained)?;

        let predictions = state.model.forecast(steps)?;
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(ForecastError::ForecastingError(format!(
                "{} produced non-finite predictions",
                state.summary.model_used
            )));
        }

        let margin = self.config.confidence_z * state.summary.residual_std;
        let lower = predictions.iter().map(|p| p - margin).collect();
        let upper = predictions.iter().map(|p| p + margin).collect();

        debug!(steps, model = %state.summary.model_used, "Forecast generated");

        Ok(ForecastResult {
            dates: future_dates(state.last_timestamp, steps),
            model_used: state.summary.model_used.clone(),
            confidence_interval: ConfidenceInterval {
                lower,
                upper,
                confidence_level: confidence_level(self.config.confidence_z),
            },
            predictions,
        })
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Fitted state, if trained
    pub fn state(&self) -> Option<&ForecasterState> {
        self.state.as_ref()
    }

    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }
}

/// Fit on the training part and score a multi-step forecast over the test part
fn evaluate_candidate(
    candidate: &dyn ForecastModel,
    train: &ObservationSeries,
    test: &[f64],
) -> Result<ForecastAccuracy> {
    let fitted = candidate.fit(train)?;
    let forecast = fitted.forecast(test.len())?;
    forecast_accuracy(&forecast, test)
}

/// Two-sided coverage of a normal band `± z`
fn confidence_level(z: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(normal) => (2.0 * normal.cdf(z) - 1.0).clamp(0.0, 1.0),
        Err(_) => 0.0,
    }
}
