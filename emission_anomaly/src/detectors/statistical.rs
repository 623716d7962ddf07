//! Z-score and interquartile-range detector over measurement columns

use super::{AnomalyDetector, DetectionResult};
use crate::config::EnsembleConfig;
use crate::features::{column_index, FeatureTable, MEASUREMENT_COLUMNS};
use crate::{AnomalyError, Result};
use emission_core::stats;
use serde::{Deserialize, Serialize};

/// Relative slack for rounding noise: values equal to a fence up to rounding are not
/// flagged, and a spread this small relative to the mean counts as zero
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Training statistics of one measurement column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBounds {
    pub column: String,
    pub mean: f64,
    pub std: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
}

impl ColumnBounds {
    fn z_score(&self, value: f64) -> f64 {
        if self.std > RELATIVE_TOLERANCE * self.mean.abs().max(1.0) {
            (value - self.mean) / self.std
        } else {
            0.0
        }
    }

    fn outside_fences(&self, value: f64) -> bool {
        let slack = |fence: f64| RELATIVE_TOLERANCE * fence.abs().max(1.0);
        value < self.lower_fence - slack(self.lower_fence)
            || value > self.upper_fence + slack(self.upper_fence)
    }
}

/// Flags records whose measurements are extreme relative to training statistics
///
/// A record is anomalous when any measurement column has `|z|` above the threshold
/// or falls outside `[Q1 - k·IQR, Q3 + k·IQR]`. The score is the largest `|z|`.
#[derive(Debug, Clone)]
pub struct StatisticalDetector {
    z_threshold: f64,
    iqr_multiplier: f64,
    bounds: Option<Vec<(usize, ColumnBounds)>>,
}

impl StatisticalDetector {
    /// Create a new statistical detector
    pub fn new(z_threshold: f64, iqr_multiplier: f64) -> Result<Self> {
        if !(z_threshold > 0.0 && iqr_multiplier > 0.0) {
            return Err(AnomalyError::InvalidParameter(format!(
                "thresholds must be positive, got z={} iqr={}",
                z_threshold, iqr_multiplier
            )));
        }
        Ok(Self {
            z_threshold,
            iqr_multiplier,
            bounds: None,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &EnsembleConfig) -> Result<Self> {
        Self::new(config.z_threshold, config.iqr_multiplier)
    }

    /// Per-column training statistics, once fitted
    pub fn bounds(&self) -> Option<Vec<&ColumnBounds>> {
        self.bounds
            .as_ref()
            .map(|b| b.iter().map(|(_, bounds)| bounds).collect())
    }
}

impl Default for StatisticalDetector {
    fn default() -> Self {
        Self {
            z_threshold: 3.0,
            iqr_multiplier: 1.5,
            bounds: None,
        }
    }
}

impl AnomalyDetector for StatisticalDetector {
    fn name(&self) -> &str {
        "statistical"
    }

    fn fit(&mut self, table: &FeatureTable) -> Result<()> {
        if table.len() < 2 {
            return Err(AnomalyError::InsufficientData(format!(
                "statistical detector needs at least 2 records, got {}",
                table.len()
            )));
        }

        let mut bounds = Vec::with_capacity(MEASUREMENT_COLUMNS.len());
        for name in MEASUREMENT_COLUMNS {
            let index = column_index(name)
                .ok_or_else(|| AnomalyError::FeatureMismatch(format!("unknown column '{}'", name)))?;
            let column = table.column(name)?;
            let q1 = stats::quantile(&column, 0.25);
            let q3 = stats::quantile(&column, 0.75);
            let iqr = q3 - q1;
            bounds.push((
                index,
                ColumnBounds {
                    column: name.to_string(),
                    mean: stats::mean(&column),
                    std: stats::sample_std(&column),
                    lower_fence: q1 - self.iqr_multiplier * iqr,
                    upper_fence: q3 + self.iqr_multiplier * iqr,
                },
            ));
        }

        self.bounds = Some(bounds);
        Ok(())
    }

    fn detect(&self, table: &FeatureTable) -> Result<DetectionResult> {
        let bounds = self
            .bounds
            .as_ref()
            .ok_or_else(|| AnomalyError::NotFitted(self.name().to_string()))?;

        let mut is_anomaly = Vec::with_capacity(table.len());
        let mut scores = Vec::with_capacity(table.len());
        for row in table.rows() {
            let mut flagged = false;
            let mut score: f64 = 0.0;
            for (index, column) in bounds {
                let value = row[*index];
                let z = column.z_score(value).abs();
                score = score.max(z);
                flagged |= z > self.z_threshold || column.outside_fences(value);
            }
            is_anomaly.push(flagged);
            scores.push(score);
        }

        Ok(DetectionResult::new(is_anomaly, scores, self.z_threshold))
    }

    fn is_fitted(&self) -> bool {
        self.bounds.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::prepare_features;
    use chrono::{TimeZone, Utc};
    use emission_core::ObservationSeries;

    fn table(values: &[f64]) -> FeatureTable {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        prepare_features(&ObservationSeries::from_daily_values(start, values).unwrap()).unwrap()
    }

    #[test]
    fn test_constant_history_flags_nothing() {
        let table = table(&[42.0; 40]);
        let mut detector = StatisticalDetector::default();
        detector.fit(&table).unwrap();
        let result = detector.detect(&table).unwrap();
        assert_eq!(result.anomaly_count(), 0);
        assert!(result.scores.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_new_record_outside_training_fences() {
        let history: Vec<f64> = (0..120).map(|i| 100.0 + ((i * 37) % 17) as f64 * 0.5).collect();
        let mut detector = StatisticalDetector::default();
        detector.fit(&table(&history)).unwrap();

        let mut latest = history.clone();
        latest[100] = 130.0;
        let result = detector.detect(&table(&latest)).unwrap();
        assert!(result.is_anomaly[100]);
        assert!(result.scores[100] > 3.0);
    }

    #[test]
    fn test_rounding_spread_is_not_a_deviation() {
        let bounds = ColumnBounds {
            column: "rolling_std_30".to_string(),
            mean: 0.830_454_798_537_400_2,
            std: 4e-16,
            lower_fence: 0.830_454_798_537_399_7,
            upper_fence: 0.830_454_798_537_399_7,
        };
        let value = 0.830_454_798_537_401_3;
        assert_eq!(bounds.z_score(value), 0.0);
        assert!(!bounds.outside_fences(value));
    }

    #[test]
    fn test_rejects_non_positive_thresholds() {
        assert!(StatisticalDetector::new(0.0, 1.5).is_err());
        assert!(StatisticalDetector::new(3.0, -1.0).is_err());
    }
}
