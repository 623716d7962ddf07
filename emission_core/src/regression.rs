//! Least-squares fitting
//!
//! Contains:
//! - Simple linear regression with goodness-of-fit and significance
//! - Penalised multiple least squares solved through the normal equations
//! - Column standardisation for feature matrices

use crate::stats;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Fitted simple linear regression `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    slope: f64,
    intercept: f64,
    r_squared: f64,
    p_value: f64,
    n: usize,
}

impl LinearRegression {
    /// Fit a line through paired observations
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(CoreError::InvalidInput(format!(
                "x and y lengths differ ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(CoreError::InsufficientData(
                "Need at least 2 points for linear regression".to_string(),
            ));
        }

        let n = x.len() as f64;
        let x_mean = x.iter().sum::<f64>() / n;
        let y_mean = y.iter().sum::<f64>() / n;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        let mut syy = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            sxy += (xi - x_mean) * (yi - y_mean);
            sxx += (xi - x_mean) * (xi - x_mean);
            syy += (yi - y_mean) * (yi - y_mean);
        }

        if sxx.abs() < 1e-10 {
            return Err(CoreError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        // Flat series: the line explains everything there is to explain
        let r_squared = if syy.abs() < 1e-12 {
            0.0
        } else {
            (sxy * sxy / (sxx * syy)).clamp(0.0, 1.0)
        };

        let p_value = slope_p_value(slope, sxx, syy - slope * sxy, x.len());

        Ok(Self {
            slope,
            intercept,
            r_squared,
            p_value,
            n: x.len(),
        })
    }

    /// Fit a line against positions `0, 1, 2, ...`
    pub fn fit_indexed(y: &[f64]) -> Result<Self> {
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
        Self::fit(&x, y)
    }

    /// Evaluate the line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient of determination
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Two-sided p-value of the slope under a Student-t null
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Number of points the line was fitted on
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

fn slope_p_value(slope: f64, sxx: f64, sse: f64, n: usize) -> f64 {
    if n <= 2 {
        return 1.0;
    }
    let dof = (n - 2) as f64;
    let residual_variance = sse.max(0.0) / dof;
    let standard_error = (residual_variance / sxx).sqrt();

    if standard_error < 1e-15 {
        // Perfect fit
        return if slope.abs() > 0.0 { 0.0 } else { 1.0 };
    }

    let t = slope / standard_error;
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => stats::finite_or_zero(2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

/// Solve `min ||X b - y||^2 + sum(penalty_j * b_j^2)` for `b`
///
/// `design` holds one row per observation. `penalties` may be empty (ordinary least
/// squares) or hold one non-negative weight per column. A tiny ridge is always added
/// so that collinear designs still produce a solution.
pub fn least_squares(design: &[Vec<f64>], targets: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    if design.is_empty() {
        return Err(CoreError::InsufficientData(
            "Design matrix has no rows".to_string(),
        ));
    }
    if design.len() != targets.len() {
        return Err(CoreError::InvalidInput(format!(
            "Design has {} rows but {} targets",
            design.len(),
            targets.len()
        )));
    }

    let k = design[0].len();
    if k == 0 {
        return Err(CoreError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if design.iter().any(|row| row.len() != k) {
        return Err(CoreError::InvalidInput(
            "Design matrix rows have inconsistent widths".to_string(),
        ));
    }
    if !penalties.is_empty() && penalties.len() != k {
        return Err(CoreError::InvalidInput(format!(
            "Expected {} penalties, got {}",
            k,
            penalties.len()
        )));
    }

    // Build normal equations X'X b = X'y
    let mut gram = vec![vec![0.0; k]; k];
    let mut moment = vec![0.0; k];
    for (row, &y) in design.iter().zip(targets) {
        for i in 0..k {
            moment[i] += row[i] * y;
            for j in i..k {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
        let penalty = penalties.get(i).copied().unwrap_or(0.0).max(0.0);
        gram[i][i] += penalty + 1e-9;
    }

    let solution = solve_linear_system(gram, moment)?;
    if solution.iter().any(|b| !b.is_finite()) {
        return Err(CoreError::CalculationError(
            "Least-squares solution is not finite".to_string(),
        ));
    }
    Ok(solution)
}

/// Gaussian elimination with partial pivoting
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(CoreError::InvalidInput(
            "Linear system must be square".to_string(),
        ));
    }

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);

        if a[pivot][col].abs() < 1e-12 {
            return Err(CoreError::CalculationError(
                "Linear system is singular".to_string(),
            ));
        }

        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}

/// Dot product of two equally long slices
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Per-column standardisation fitted on a training matrix
///
/// Columns with zero spread keep a unit scale so that transformed values stay finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first().map(Vec::len).ok_or_else(|| {
            CoreError::InsufficientData("Cannot fit a scaler on zero rows".to_string())
        })?;

        let mut means = Vec::with_capacity(width);
        let mut scales = Vec::with_capacity(width);
        for col in 0..width {
            let column: Vec<f64> = rows.iter().map(|r| r.get(col).copied().unwrap_or(0.0)).collect();
            means.push(stats::mean(&column));
            let std = stats::population_std(&column);
            scales.push(if std > 1e-12 { std } else { 1.0 });
        }

        Ok(Self { means, scales })
    }

    /// Standardise one row
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    /// Standardise every row
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }

    /// Number of columns the scaler was fitted on
    pub fn width(&self) -> usize {
        self.means.len()
    }
}
