//! Projector configuration

use crate::error::{Result, ScenarioError};
use serde::{Deserialize, Serialize};

/// How intervention effectiveness is perturbed during projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum UncertaintyMode {
    /// Projections are deterministic
    #[default]
    Disabled,
    /// Each active year draws a factor from `N(1, uncertainty)` seeded per projection
    Seeded { seed: u64 },
}

/// Tuning knobs for a [`ScenarioProjector`](crate::ScenarioProjector)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Value of one avoided tonne CO2e
    pub carbon_price: f64,
    /// Annual discount rate for net present value
    pub discount_rate: f64,
    /// Spending ceiling when selecting interventions for a target
    pub budget_ceiling: f64,
    /// Feasibility score from which a target counts as achievable
    pub achievable_threshold: f64,
    pub uncertainty: UncertaintyMode,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            carbon_price: 50.0,
            discount_rate: 0.05,
            budget_ceiling: 1_000_000.0,
            achievable_threshold: 0.8,
            uncertainty: UncertaintyMode::Disabled,
        }
    }
}

impl ScenarioConfig {
    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if !(self.carbon_price.is_finite() && self.carbon_price >= 0.0) {
            return Err(ScenarioError::InvalidParameter(format!(
                "carbon_price must be non-negative, got {}",
                self.carbon_price
            )));
        }
        if !(self.discount_rate.is_finite() && self.discount_rate > -1.0) {
            return Err(ScenarioError::InvalidParameter(format!(
                "discount_rate must be greater than -1, got {}",
                self.discount_rate
            )));
        }
        if !(self.budget_ceiling.is_finite() && self.budget_ceiling > 0.0) {
            return Err(ScenarioError::InvalidParameter(format!(
                "budget_ceiling must be positive, got {}",
                self.budget_ceiling
            )));
        }
        if !(0.0..=1.0).contains(&self.achievable_threshold) {
            return Err(ScenarioError::InvalidParameter(format!(
                "achievable_threshold must be in [0, 1], got {}",
                self.achievable_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScenarioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.uncertainty, UncertaintyMode::Disabled);
    }

    #[test]
    fn test_rejects_negative_carbon_price() {
        let config = ScenarioConfig {
            carbon_price: -1.0,
            ..ScenarioConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
