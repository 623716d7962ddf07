//! Additive trend plus multi-seasonality model
//!
//! `y(t) = g(t) + s_week(t) + s_year(t)`, where `g` is a piecewise-linear trend with
//! hinge changepoints and the seasonal terms are Fourier series. All terms are fitted
//! jointly by penalised least squares; changepoint adjustments carry a ridge penalty so
//! that the trend only bends where the data insists.

use crate::error::{ForecastError, Result};
use crate::models::{residual_std, FittedModel, ForecastModel, TrainedForecastModel};
use emission_core::regression::{dot, least_squares};
use emission_core::ObservationSeries;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const MODEL_NAME: &str = "trend_seasonal";

const WEEKLY_ORDER: usize = 3;
const YEARLY_ORDER: usize = 5;
const WEEKLY_PERIOD: f64 = 7.0;
const YEARLY_PERIOD: f64 = 365.25;
/// Changepoints are placed over this leading share of the history
const CHANGEPOINT_RANGE: f64 = 0.8;
/// Ridge penalty on Fourier coefficients
const SEASONALITY_PENALTY: f64 = 0.01;

/// Trend + weekly + yearly seasonality candidate
#[derive(Debug, Clone)]
pub struct TrendSeasonalModel {
    max_changepoints: usize,
    changepoint_penalty: f64,
}

/// Fitted trend/seasonal model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeasonalFit {
    coefficients: Vec<f64>,
    /// Changepoint locations on the scaled time axis
    changepoints: Vec<f64>,
    /// Length of the fitted history, which maps to scaled time 1.0
    time_scale: f64,
    yearly: bool,
    residual_std: f64,
}

impl TrendSeasonalModel {
    /// Create a new trend/seasonal candidate
    pub fn new(max_changepoints: usize, changepoint_penalty: f64) -> Self {
        Self {
            max_changepoints,
            changepoint_penalty,
        }
    }
}

impl ForecastModel for TrendSeasonalModel {
    fn fit(&self, series: &ObservationSeries) -> Result<FittedModel> {
        let values = series.values();
        let n = values.len();
        if n < 2 * WEEKLY_ORDER + 4 {
            return Err(ForecastError::ForecastingError(format!(
                "{} needs at least {} points, got {}",
                MODEL_NAME,
                2 * WEEKLY_ORDER + 4,
                n
            )));
        }

        let time_scale = n as f64;
        let yearly = n >= 730;

        // Roughly one changepoint per ten observations, capped
        let count = self.max_changepoints.min(n / 10);
        let changepoints: Vec<f64> = (1..=count)
            .map(|k| CHANGEPOINT_RANGE * k as f64 / (count + 1) as f64)
            .collect();

        let layout = Layout {
            changepoints: &changepoints,
            time_scale,
            yearly,
        };
        let design: Vec<Vec<f64>> = (0..n).map(|i| layout.row(i)).collect();
        let penalties = layout.penalties(self.changepoint_penalty);

        let coefficients = least_squares(&design, &values, &penalties)?;
        let fitted: Vec<f64> = design.iter().map(|row| dot(row, &coefficients)).collect();

        Ok(FittedModel::TrendSeasonal(TrendSeasonalFit {
            residual_std: residual_std(&values, &fitted),
            coefficients,
            changepoints,
            time_scale,
            yearly,
        }))
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

impl TrendSeasonalFit {
    /// Scaled changepoint locations
    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    /// Whether yearly seasonality was fitted
    pub fn has_yearly(&self) -> bool {
        self.yearly
    }
}

impl TrainedForecastModel for TrendSeasonalFit {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let layout = Layout {
            changepoints: &self.changepoints,
            time_scale: self.time_scale,
            yearly: self.yearly,
        };
        let start = self.time_scale as usize;

        Ok((start..start + horizon)
            .map(|i| dot(&layout.row(i), &self.coefficients))
            .collect())
    }

    fn residual_std(&self) -> f64 {
        self.residual_std
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

/// Column layout of the design matrix
struct Layout<'a> {
    changepoints: &'a [f64],
    time_scale: f64,
    yearly: bool,
}

impl Layout<'_> {
    /// Intercept, slope, hinges, weekly terms, then yearly terms
    fn row(&self, index: usize) -> Vec<f64> {
        let t = index as f64 / self.time_scale;
        let day = index as f64;

        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&c| (t - c).max(0.0)));
        push_fourier(&mut row, day, WEEKLY_PERIOD, WEEKLY_ORDER);
        if self.yearly {
            push_fourier(&mut row, day, YEARLY_PERIOD, YEARLY_ORDER);
        }
        row
    }

    fn width(&self) -> usize {
        2 + self.changepoints.len()
            + 2 * WEEKLY_ORDER
            + if self.yearly { 2 * YEARLY_ORDER } else { 0 }
    }

    fn penalties(&self, changepoint_penalty: f64) -> Vec<f64> {
        let mut penalties = vec![0.0, 0.0];
        penalties.extend(std::iter::repeat(changepoint_penalty).take(self.changepoints.len()));
        penalties.resize(self.width(), SEASONALITY_PENALTY);
        penalties
    }
}

fn push_fourier(row: &mut Vec<f64>, day: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * day / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_recovers_trend_and_weekly_cycle() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let weekly = |i: usize| 8.0 * (2.0 * PI * i as f64 / 7.0).sin();
        let values: Vec<f64> = (0..120).map(|i| 200.0 + 0.4 * i as f64 + weekly(i)).collect();
        let series = ObservationSeries::from_daily_values(start, &values).unwrap();

        let fitted = TrendSeasonalModel::new(25, 10.0).fit(&series).unwrap();
        assert!(fitted.residual_std() < 1.0);

        let forecast = fitted.forecast(7).unwrap();
        for (step, prediction) in forecast.iter().enumerate() {
            let i = 120 + step;
            let expected = 200.0 + 0.4 * i as f64 + weekly(i);
            assert!((prediction - expected).abs() < 3.0);
        }
    }

    #[test]
    fn test_layout_width_matches_row() {
        let changepoints = [0.2, 0.4];
        let layout = Layout {
            changepoints: &changepoints,
            time_scale: 100.0,
            yearly: true,
        };
        assert_eq!(layout.row(5).len(), layout.width());
        assert_eq!(layout.penalties(1.0).len(), layout.width());
    }
}
