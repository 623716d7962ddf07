//! Rolling-window statistics
//!
//! Windows follow the convention of trailing windows that include the current value:
//! position `i` covers `values[i + 1 - window..=i]` and is `None` until the window is full.
//! [`trailing_past`] variants exclude the current value and are used for forecasting
//! features, where the current value is unknown.

use crate::regression::LinearRegression;
use crate::stats;
use crate::{CoreError, Result};
use std::collections::VecDeque;

/// Streaming rolling window
///
/// Statistics are recomputed from the buffered values on each read, which keeps
/// constant windows at exactly zero deviation.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    /// Create a new rolling window with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(CoreError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
        })
    }

    /// Push a new value, evicting the oldest one once the window is full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }
    }

    /// Whether the window holds `period` values
    pub fn is_full(&self) -> bool {
        self.values.len() == self.period
    }

    /// Mean of the window, once full
    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.period as f64)
    }

    /// Sample standard deviation of the window, once full
    pub fn std_dev(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        let window: Vec<f64> = self.values.iter().copied().collect();
        Some(stats::sample_std(&window))
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the window, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Rolling mean over trailing windows that include the current value
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    roll(values, window, RollingWindow::mean)
}

/// Rolling sample standard deviation over trailing windows that include the current value
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    roll(values, window, RollingWindow::std_dev)
}

fn roll(
    values: &[f64],
    window: usize,
    read: fn(&RollingWindow) -> Option<f64>,
) -> Vec<Option<f64>> {
    let Ok(mut rolling) = RollingWindow::new(window) else {
        return vec![None; values.len()];
    };

    values
        .iter()
        .map(|&v| {
            rolling.update(v);
            read(&rolling)
        })
        .collect()
}

/// Slope of a least-squares line fitted to each trailing window
pub fn rolling_slope(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            LinearRegression::fit_indexed(&values[i + 1 - window..=i])
                .ok()
                .map(|line| line.slope())
        })
        .collect()
}

/// Mean and sample standard deviation of the `window` values strictly before `end`
///
/// Returns `None` when fewer than `window` values precede `end`.
pub fn trailing_past(values: &[f64], end: usize, window: usize) -> Option<(f64, f64)> {
    if window == 0 || end < window || end > values.len() {
        return None;
    }
    let slice = &values[end - window..end];
    Some((stats::mean(slice), stats::sample_std(slice)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rolling_mean_waits_for_full_window() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let means = rolling_mean(&values, 3);
        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_abs_diff_eq!(means[2].unwrap(), 2.0);
        assert_abs_diff_eq!(means[3].unwrap(), 3.0);
    }

    #[test]
    fn test_rolling_std_constant_is_zero() {
        let values = [5.0; 10];
        let stds = rolling_std(&values, 4);
        assert!(stds.iter().flatten().all(|s| *s == 0.0));
    }

    #[test]
    fn test_rolling_slope_linear() {
        let values: Vec<f64> = (0..10).map(|i| 2.0 * i as f64 + 1.0).collect();
        let slopes = rolling_slope(&values, 4);
        assert_abs_diff_eq!(slopes[9].unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trailing_past_excludes_current() {
        let values = [1.0, 2.0, 3.0, 100.0];
        let (m, _) = trailing_past(&values, 3, 3).unwrap();
        assert_abs_diff_eq!(m, 2.0);
        assert!(trailing_past(&values, 2, 3).is_none());
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(RollingWindow::new(0).is_err());
    }
}
