//! Descriptive trend, seasonality and change-point analysis

use crate::error::Result;
use chrono::{DateTime, Datelike, Utc};
use emission_core::regression::LinearRegression;
use emission_core::rolling::rolling_mean;
use emission_core::{stats, ObservationSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Window of the rolling mean scanned for change points
const CHANGE_WINDOW: usize = 30;
/// Number of change-point dates reported
const REPORTED_CHANGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub slope: f64,
    pub trend_direction: TrendDirection,
    pub r_squared: f64,
    pub p_value: f64,
    pub is_significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    /// Mean value per calendar month present in the data (1 = January)
    pub monthly_averages: BTreeMap<u32, f64>,
    /// Standard deviation of the monthly averages
    pub seasonal_variation: f64,
    pub peak_month: u32,
    pub low_month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoints {
    pub num_change_points: usize,
    /// The first few change-point timestamps
    pub change_dates: Vec<DateTime<Utc>>,
}

/// Full trend analysis of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub statistics: SeriesStatistics,
    pub trend_analysis: TrendSummary,
    pub seasonality: Seasonality,
    pub change_points: ChangePoints,
}

/// Stateless analyzer of emission trends
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze statistics, linear trend, monthly seasonality and change points
    pub fn analyze(&self, series: &ObservationSeries) -> Result<TrendAnalysis> {
        let values = series.values();
        let timestamps = series.timestamps();

        let statistics = SeriesStatistics {
            count: values.len(),
            mean: stats::mean(&values),
            std: stats::sample_std(&values),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            total: values.iter().sum(),
        };

        Ok(TrendAnalysis {
            statistics,
            trend_analysis: trend_summary(&values),
            seasonality: seasonality(&values, &timestamps),
            change_points: change_points(&values, &timestamps),
        })
    }
}

fn trend_summary(values: &[f64]) -> TrendSummary {
    match LinearRegression::fit_indexed(values) {
        Ok(line) => {
            let slope = line.slope();
            let trend_direction = if slope > 0.0 {
                TrendDirection::Increasing
            } else if slope < 0.0 {
                TrendDirection::Decreasing
            } else {
                TrendDirection::Stable
            };
            TrendSummary {
                slope,
                trend_direction,
                r_squared: line.r_squared(),
                p_value: line.p_value(),
                is_significant: line.p_value() < 0.05,
            }
        }
        // A single observation has no trend
        Err(_) => TrendSummary {
            slope: 0.0,
            trend_direction: TrendDirection::Stable,
            r_squared: 0.0,
            p_value: 1.0,
            is_significant: false,
        },
    }
}

fn seasonality(values: &[f64], timestamps: &[DateTime<Utc>]) -> Seasonality {
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for (value, ts) in values.iter().zip(timestamps) {
        by_month.entry(ts.month()).or_default().push(*value);
    }

    let monthly_averages: BTreeMap<u32, f64> = by_month
        .iter()
        .map(|(&month, vals)| (month, stats::mean(vals)))
        .collect();
    let averages: Vec<f64> = monthly_averages.values().copied().collect();

    let pick = |better: fn(f64, f64) -> bool| {
        monthly_averages
            .iter()
            .fold(None, |best: Option<(u32, f64)>, (&m, &v)| match best {
                Some((_, b)) if !better(v, b) => best,
                _ => Some((m, v)),
            })
            .map_or(0, |(m, _)| m)
    };

    Seasonality {
        seasonal_variation: stats::sample_std(&averages),
        peak_month: pick(|v, b| v > b),
        low_month: pick(|v, b| v < b),
        monthly_averages,
    }
}

fn change_points(values: &[f64], timestamps: &[DateTime<Utc>]) -> ChangePoints {
    let means = rolling_mean(values, CHANGE_WINDOW);

    // First differences of the rolling mean, tagged with the later position
    let diffs: Vec<(usize, f64)> = means
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| match (w[0], w[1]) {
            (Some(a), Some(b)) => Some((i + 1, b - a)),
            _ => None,
        })
        .collect();

    let magnitudes: Vec<f64> = diffs.iter().map(|(_, d)| *d).collect();
    let threshold = 2.0 * stats::population_std(&magnitudes);

    let significant: Vec<usize> = diffs
        .iter()
        .filter(|(_, d)| threshold > 0.0 && d.abs() > threshold)
        .map(|(i, _)| *i)
        .collect();

    ChangePoints {
        num_change_points: significant.len(),
        change_dates: significant
            .iter()
            .take(REPORTED_CHANGES)
            .filter_map(|&i| timestamps.get(i).copied())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_detects_level_shift() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let values: Vec<f64> = (0..200)
            .map(|i| (if i < 100 { 10.0 } else { 50.0 }) + (i % 3) as f64 * 0.1)
            .collect();
        let series = ObservationSeries::from_daily_values(start, &values).unwrap();

        let analysis = TrendAnalyzer::new().analyze(&series).unwrap();
        assert!(analysis.change_points.num_change_points > 0);
        assert!(analysis.change_points.change_dates.len() <= 5);
        assert_eq!(analysis.trend_analysis.trend_direction, TrendDirection::Increasing);
        assert!(analysis.trend_analysis.is_significant);
    }
}
