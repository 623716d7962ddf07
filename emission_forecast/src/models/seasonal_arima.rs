//! Seasonal decomposition followed by ARIMA on the adjusted series
//!
//! The seasonal component is estimated with a centred moving average and per-phase
//! averages of the detrended values. The seasonally adjusted series is modelled as
//! ARIMA(p, d, q); coefficients come from the two-stage Hannan–Rissanen regression and
//! the order is chosen by minimum AIC over the configured grid.

use crate::error::{ForecastError, Result};
use crate::models::{FittedModel, ForecastModel, TrainedForecastModel};
use emission_core::regression::{dot, least_squares};
use emission_core::{stats, ObservationSeries};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MODEL_NAME: &str = "seasonal_arima";

/// ARIMA candidate with classical seasonal adjustment
#[derive(Debug, Clone)]
pub struct SeasonalArimaModel {
    period: usize,
    max_p: usize,
    max_d: usize,
    max_q: usize,
}

/// Fitted seasonal ARIMA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalArimaFit {
    /// Selected (p, d, q)
    order: (usize, usize, usize),
    period: usize,
    /// Seasonal index per phase; empty when the history was too short to adjust
    seasonal: Vec<f64>,
    /// Phase of the first forecast step
    next_phase: usize,
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// Last value of each differencing stage, used to integrate forecasts
    levels: Vec<f64>,
    /// Last `p` differenced values
    z_tail: Vec<f64>,
    /// Last `q` residuals
    e_tail: Vec<f64>,
    aic: f64,
    residual_std: f64,
}

/// ARMA fit on an already differenced series
#[derive(Debug, Clone)]
struct ArmaFit {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    residuals: Vec<f64>,
    aic: f64,
    residual_std: f64,
}

impl SeasonalArimaModel {
    /// Create a new seasonal ARIMA candidate searching orders up to the given bounds
    pub fn new(period: usize, max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self {
            period,
            max_p,
            max_d,
            max_q,
        }
    }

    /// Best ARIMA order by AIC for the adjusted series
    fn search_order(&self, adjusted: &[f64]) -> Result<((usize, usize, usize), ArmaFit)> {
        let mut best: Option<((usize, usize, usize), ArmaFit)> = None;

        for d in 0..=self.max_d {
            let z = difference(adjusted, d);
            for p in 0..=self.max_p {
                for q in 0..=self.max_q {
                    match fit_arma(&z, p, q) {
                        Ok(fit) => {
                            debug!(p, d, q, aic = fit.aic, "ARIMA order evaluated");
                            let better = best.as_ref().map_or(true, |(_, b)| fit.aic < b.aic);
                            if better {
                                best = Some(((p, d, q), fit));
                            }
                        }
                        Err(err) => {
                            debug!(p, d, q, error = %err, "ARIMA order skipped");
                        }
                    }
                }
            }
        }

        best.ok_or_else(|| {
            ForecastError::ForecastingError("No ARIMA order could be fitted".to_string())
        })
    }
}

impl ForecastModel for SeasonalArimaModel {
    fn fit(&self, series: &ObservationSeries) -> Result<FittedModel> {
        let values = series.values();
        if values.len() < 4 {
            return Err(ForecastError::ForecastingError(format!(
                "{} needs at least 4 points, got {}",
                MODEL_NAME,
                values.len()
            )));
        }

        // Seasonal adjustment only when two full cycles are available
        let seasonal = if self.period >= 2 && values.len() >= 2 * self.period {
            seasonal_indices(&values, self.period)
        } else {
            Vec::new()
        };
        let adjusted: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(i, v)| v - seasonal_at(&seasonal, i))
            .collect();

        let ((p, d, q), arma) = self.search_order(&adjusted)?;

        let levels = (0..d)
            .map(|k| difference(&adjusted, k).last().copied().unwrap_or(0.0))
            .collect();
        let z = difference(&adjusted, d);

        Ok(FittedModel::SeasonalArima(SeasonalArimaFit {
            order: (p, d, q),
            period: self.period,
            seasonal,
            next_phase: values.len() % self.period.max(1),
            intercept: arma.intercept,
            ar: arma.ar,
            ma: arma.ma,
            levels,
            z_tail: z[z.len().saturating_sub(p)..].to_vec(),
            e_tail: arma.residuals[arma.residuals.len().saturating_sub(q)..].to_vec(),
            aic: arma.aic,
            residual_std: arma.residual_std,
        }))
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

impl SeasonalArimaFit {
    /// Selected (p, d, q) order
    pub fn order(&self) -> (usize, usize, usize) {
        self.order
    }

    /// Akaike information criterion of the selected order
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Seasonal index per phase (empty when no adjustment was applied)
    pub fn seasonal_indices(&self) -> &[f64] {
        &self.seasonal
    }
}

impl TrainedForecastModel for SeasonalArimaFit {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let mut z_hist = self.z_tail.clone();
        let mut e_hist = self.e_tail.clone();
        let mut levels = self.levels.clone();
        let mut forecasts = Vec::with_capacity(horizon);

        for step in 0..horizon {
            let mut z_next = self.intercept;
            for (i, phi) in self.ar.iter().enumerate() {
                z_next += phi * z_hist.get(z_hist.len().wrapping_sub(i + 1)).copied().unwrap_or(0.0);
            }
            for (j, theta) in self.ma.iter().enumerate() {
                z_next += theta * e_hist.get(e_hist.len().wrapping_sub(j + 1)).copied().unwrap_or(0.0);
            }
            z_hist.push(z_next);
            // Future shocks have zero expectation
            e_hist.push(0.0);

            // Undo differencing stage by stage
            let mut value = z_next;
            for level in levels.iter_mut().rev() {
                *level += value;
                value = *level;
            }

            let phase = self.next_phase + step;
            let prediction = value + seasonal_at(&self.seasonal, phase);
            if !prediction.is_finite() {
                return Err(ForecastError::ForecastingError(format!(
                    "ARIMA{:?} forecast diverged at step {}",
                    self.order,
                    step + 1
                )));
            }
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

fn seasonal_at(seasonal: &[f64], index: usize) -> f64 {
    if seasonal.is_empty() {
        0.0
    } else {
        seasonal[index % seasonal.len()]
    }
}

/// Apply first differences `d` times
pub(crate) fn difference(values: &[f64], d: usize) -> Vec<f64> {
    let mut current = values.to_vec();
    for _ in 0..d {
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    current
}

/// Additive seasonal indices from a centred moving average, centred on zero
pub(crate) fn seasonal_indices(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];

    for i in half..n.saturating_sub(half) {
        let trend = if period % 2 == 1 {
            values[i - half..=i + half].iter().sum::<f64>() / period as f64
        } else {
            // 2 x m moving average for even periods
            let inner: f64 = values[i - half + 1..i + half].iter().sum();
            (0.5 * values[i - half] + inner + 0.5 * values[i + half]) / period as f64
        };
        sums[i % period] += values[i] - trend;
        counts[i % period] += 1;
    }

    let raw: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();
    let centre = stats::mean(&raw);
    raw.iter().map(|s| s - centre).collect()
}

/// Hannan–Rissanen estimation of ARMA(p, q) with intercept
fn fit_arma(z: &[f64], p: usize, q: usize) -> Result<ArmaFit> {
    let m = z.len();

    // Stage 1: long autoregression supplies residual estimates for the MA lags
    let (innovations, stage_one_order) = if q > 0 {
        let long_order = (p + q + 3).min(m / 3);
        if long_order <= q {
            return Err(ForecastError::ForecastingError(format!(
                "Series too short for MA order {}",
                q
            )));
        }
        let coef = regress_on_lags(z, &[], long_order, 0, long_order)?;
        let mut innovations = vec![0.0; m];
        for t in long_order..m {
            innovations[t] = z[t] - predict_arma(&coef, z, &[], t, long_order, 0);
        }
        (innovations, long_order)
    } else {
        (Vec::new(), 0)
    };

    // Stage 2: regress on own lags and lagged innovations
    let start = p.max(stage_one_order + q);
    let coef = regress_on_lags(z, &innovations, p, q, start)?;

    let intercept = coef[0];
    let ar = coef[1..=p].to_vec();
    let ma = coef[p + 1..].to_vec();

    // Recursive residuals with the final coefficients
    let first = p.max(q);
    let mut residuals = vec![0.0; m];
    for t in first..m {
        residuals[t] = z[t] - predict_arma(&coef, z, &residuals, t, p, q);
        if !residuals[t].is_finite() {
            return Err(ForecastError::ForecastingError(format!(
                "ARMA({}, {}) residuals diverged",
                p, q
            )));
        }
    }

    let used = &residuals[first..];
    let n_eff = used.len();
    if n_eff < p + q + 2 {
        return Err(ForecastError::ForecastingError(format!(
            "Not enough observations for ARMA({}, {})",
            p, q
        )));
    }

    let sigma2 = used.iter().map(|e| e * e).sum::<f64>() / n_eff as f64;
    let aic = n_eff as f64 * sigma2.max(1e-12).ln() + 2.0 * (p + q + 1) as f64;
    if !aic.is_finite() {
        return Err(ForecastError::ForecastingError(
            "Information criterion is not finite".to_string(),
        ));
    }

    Ok(ArmaFit {
        intercept,
        ar,
        ma,
        residual_std: stats::sample_std(used),
        residuals,
        aic,
    })
}

/// Least squares of `z[t]` on an intercept, `p` own lags and `q` innovation lags
fn regress_on_lags(
    z: &[f64],
    innovations: &[f64],
    p: usize,
    q: usize,
    start: usize,
) -> Result<Vec<f64>> {
    let width = 1 + p + q;
    let mut design = Vec::new();
    let mut targets = Vec::new();

    for t in start..z.len() {
        let mut row = Vec::with_capacity(width);
        row.push(1.0);
        row.extend((1..=p).map(|i| z[t - i]));
        row.extend((1..=q).map(|j| innovations[t - j]));
        design.push(row);
        targets.push(z[t]);
    }

    if design.len() <= width {
        return Err(ForecastError::ForecastingError(format!(
            "Need more than {} rows to estimate {} coefficients, have {}",
            width,
            width,
            design.len()
        )));
    }

    Ok(least_squares(&design, &targets, &[])?)
}

fn predict_arma(coef: &[f64], z: &[f64], innovations: &[f64], t: usize, p: usize, q: usize) -> f64 {
    let mut row = Vec::with_capacity(1 + p + q);
    row.push(1.0);
    row.extend((1..=p).map(|i| if t >= i { z[t - i] } else { 0.0 }));
    row.extend((1..=q).map(|j| if t >= j { innovations[t - j] } else { 0.0 }));
    dot(&row, coef)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_difference() {
        let values = [1.0, 3.0, 6.0, 10.0];
        assert_eq!(difference(&values, 1), vec![2.0, 3.0, 4.0]);
        assert_eq!(difference(&values, 2), vec![1.0, 1.0]);
    }

    #[test]
    fn test_seasonal_indices_recover_pattern() {
        let pattern = [5.0, -2.0, -3.0, 0.0, 4.0, -1.0, -3.0];
        let values: Vec<f64> = (0..70).map(|i| 50.0 + pattern[i % 7]).collect();
        let indices = seasonal_indices(&values, 7);
        for (idx, expected) in indices.iter().zip(pattern) {
            assert_abs_diff_eq!(*idx, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_trending_series_forecast_continues() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let values: Vec<f64> = (0..80)
            .map(|i| 100.0 + 0.5 * i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let series = ObservationSeries::from_daily_values(start, &values).unwrap();

        let fitted = SeasonalArimaModel::new(7, 2, 1, 2).fit(&series).unwrap();
        let forecast = fitted.forecast(5).unwrap();
        assert_eq!(forecast.len(), 5);
        assert!(forecast.iter().all(|v| v.is_finite()));
        assert!(forecast[4] > 130.0 && forecast[4] < 150.0);
    }
}
