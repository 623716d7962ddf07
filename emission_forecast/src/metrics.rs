//! Accuracy metrics for evaluating forecasts

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Held-out error of one candidate model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Ranking key for model selection
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals
    pub mape: f64,
    pub smape: f64,
}

/// Score a forecast against the held-out actuals
///
/// Zero actuals are left out of MAPE; a pair of zeros contributes nothing to SMAPE.
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.is_empty() || forecast.len() != actual.len() {
        return Err(ForecastError::ValidationError(format!(
            "cannot score {} predictions against {} actuals",
            forecast.len(),
            actual.len()
        )));
    }

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut pct_count = 0usize;
    let mut sym_sum = 0.0;
    for (&predicted, &observed) in forecast.iter().zip(actual) {
        let residual = observed - predicted;
        abs_sum += residual.abs();
        sq_sum += residual * residual;
        if observed != 0.0 {
            pct_sum += (residual / observed).abs();
            pct_count += 1;
        }
        let scale = observed.abs() + predicted.abs();
        if scale > 0.0 {
            sym_sum += 2.0 * residual.abs() / scale;
        }
    }

    let n = forecast.len() as f64;
    let mse = sq_sum / n;
    let accuracy = ForecastAccuracy {
        mae: abs_sum / n,
        mse,
        rmse: mse.sqrt(),
        mape: if pct_count == 0 { 0.0 } else { 100.0 * pct_sum / pct_count as f64 },
        smape: 100.0 * sym_sum / n,
    };
    if !(accuracy.mae.is_finite() && accuracy.rmse.is_finite()) {
        return Err(ForecastError::ValidationError(
            "forecast contains non-finite values".to_string(),
        ));
    }
    Ok(accuracy)
}

impl fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mae={:.3} rmse={:.3} mape={:.2}% smape={:.2}%",
            self.mae, self.rmse, self.mape, self.smape
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forecast_accuracy() {
        let forecast = [110.0, 190.0];
        let actual = [100.0, 200.0];
        let accuracy = forecast_accuracy(&forecast, &actual).unwrap();
        assert_abs_diff_eq!(accuracy.mae, 10.0);
        assert_abs_diff_eq!(accuracy.rmse, 10.0);
        assert_abs_diff_eq!(accuracy.mape, 7.5);
    }

    #[test]
    fn test_zero_actuals_do_not_blow_up() {
        let accuracy = forecast_accuracy(&[1.0, 0.0], &[0.0, 0.0]).unwrap();
        assert_eq!(accuracy.mape, 0.0);
        assert!(accuracy.smape.is_finite());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }
}
