//! Optimizer configuration

use crate::{OptimizerError, Result};
use serde::{Deserialize, Serialize};

/// Weights of the multi-objective score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    pub reduction: f64,
    pub cost: f64,
    pub risk: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            reduction: 0.6,
            cost: 0.3,
            risk: 0.1,
        }
    }
}

/// Search budgets and penalties shared by the strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Seed of every stochastic search
    pub seed: u64,
    /// Population members per initiative
    pub population_factor: usize,
    /// Generations of the single-objective search
    pub generations: usize,
    /// Generations of the multi-objective search
    pub multi_objective_generations: usize,
    /// Range the differential weight is drawn from each generation
    pub mutation: (f64, f64),
    /// Crossover probability
    pub recombination: f64,
    /// Objective penalty per unit of budget overage
    pub penalty_multiplier: f64,
    /// Objective value of an over-budget multi-objective selection
    pub infeasible_penalty: f64,
    pub weights: ObjectiveWeights,
    /// Risk assumed for initiatives without a risk score
    pub default_risk: f64,
    /// Smallest relaxed implementation level reported as selected
    pub implementation_threshold: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            population_factor: 15,
            generations: 100,
            multi_objective_generations: 150,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            penalty_multiplier: 1000.0,
            infeasible_penalty: 1e6,
            weights: ObjectiveWeights::default(),
            default_risk: 0.5,
            implementation_threshold: 0.01,
        }
    }
}

impl OptimizerConfig {
    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if self.population_factor == 0 || self.generations == 0 || self.multi_objective_generations == 0
        {
            return Err(OptimizerError::InvalidParameter(
                "population factor and generation counts must be positive".to_string(),
            ));
        }
        let (low, high) = self.mutation;
        if !(low > 0.0 && low <= high && high <= 2.0) {
            return Err(OptimizerError::InvalidParameter(format!(
                "mutation range must satisfy 0 < low <= high <= 2, got ({}, {})",
                low, high
            )));
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(OptimizerError::InvalidParameter(format!(
                "recombination must be in [0, 1], got {}",
                self.recombination
            )));
        }
        if !(self.penalty_multiplier > 0.0 && self.infeasible_penalty > 0.0) {
            return Err(OptimizerError::InvalidParameter(
                "penalties must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_risk) {
            return Err(OptimizerError::InvalidParameter(format!(
                "default_risk must be in [0, 1], got {}",
                self.default_risk
            )));
        }
        if !(0.0..1.0).contains(&self.implementation_threshold) {
            return Err(OptimizerError::InvalidParameter(format!(
                "implementation_threshold must be in [0, 1), got {}",
                self.implementation_threshold
            )));
        }

        let w = self.weights;
        if [w.reduction, w.cost, w.risk]
            .iter()
            .any(|x| !(x.is_finite() && *x >= 0.0))
            || (w.reduction + w.cost + w.risk - 1.0).abs() > 1e-6
        {
            return Err(OptimizerError::InvalidWeights(format!(
                "weights must be non-negative and sum to 1, got {:.3}/{:.3}/{:.3}",
                w.reduction, w.cost, w.risk
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(OptimizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = OptimizerConfig {
            weights: ObjectiveWeights {
                reduction: 0.5,
                cost: 0.3,
                risk: 0.1,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OptimizerError::InvalidWeights(_))
        ));
    }
}
