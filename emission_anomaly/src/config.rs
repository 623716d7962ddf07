//! Ensemble configuration

use crate::{AnomalyError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the three detectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Expected share of anomalous records for the density detector
    pub contamination: f64,
    /// Number of isolation trees
    pub n_trees: usize,
    /// Records sub-sampled per tree
    pub sample_size: usize,
    /// Seed for tree construction
    pub seed: u64,
    /// Z-score above which a measurement is anomalous
    pub z_threshold: f64,
    /// IQR multiplier for the quartile fences
    pub iqr_multiplier: f64,
    /// Rolling window for level-shift detection
    pub level_window: usize,
    /// Rolling-std multiplier for level shifts
    pub level_sigma: f64,
    /// Window of the rolling slope for trend-break detection
    pub trend_window: usize,
    /// Monthly-std multiplier for seasonal deviations
    pub seasonal_sigma: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            contamination: 0.1,
            n_trees: 100,
            sample_size: 256,
            seed: 42,
            z_threshold: 3.0,
            iqr_multiplier: 1.5,
            level_window: 30,
            level_sigma: 2.0,
            trend_window: 14,
            seasonal_sigma: 2.0,
        }
    }
}

impl EnsembleConfig {
    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if !(self.contamination > 0.0 && self.contamination < 0.5) {
            return Err(AnomalyError::InvalidParameter(format!(
                "contamination must be in (0, 0.5), got {}",
                self.contamination
            )));
        }
        if self.n_trees == 0 || self.sample_size < 2 {
            return Err(AnomalyError::InvalidParameter(
                "n_trees must be positive and sample_size at least 2".to_string(),
            ));
        }
        if self.level_window < 2 || self.trend_window < 2 {
            return Err(AnomalyError::InvalidParameter(
                "rolling windows must span at least 2 records".to_string(),
            ));
        }
        for (name, value) in [
            ("z_threshold", self.z_threshold),
            ("iqr_multiplier", self.iqr_multiplier),
            ("level_sigma", self.level_sigma),
            ("seasonal_sigma", self.seasonal_sigma),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnomalyError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EnsembleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_contamination_out_of_range() {
        let config = EnsembleConfig {
            contamination: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
