//! Weighted reduction, cost and risk objective

use super::evolution::{decode, DifferentialEvolution};
use super::OptimizationStrategy;
use crate::config::{ObjectiveWeights, OptimizerConfig};
use crate::problem::ReductionProblem;
use crate::result::OptimizationResult;
use crate::utils::safe_ratio;
use crate::Result;
use tracing::debug;

/// Minimise `-w_r·reduction/Σreduction + w_c·cost/budget + w_k·Σrisk/n`
///
/// Over-budget selections score a flat infeasibility penalty.
#[derive(Debug, Clone)]
pub struct MultiObjectiveStrategy {
    search: DifferentialEvolution,
    weights: ObjectiveWeights,
    default_risk: f64,
    infeasible_penalty: f64,
}

impl MultiObjectiveStrategy {
    /// Create a new multi-objective strategy
    pub fn new(
        search: DifferentialEvolution,
        weights: ObjectiveWeights,
        default_risk: f64,
        infeasible_penalty: f64,
    ) -> Self {
        Self {
            search,
            weights,
            default_risk,
            infeasible_penalty,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(
            DifferentialEvolution::new(
                config.population_factor,
                config.multi_objective_generations,
                config.mutation,
                config.recombination,
                config.seed,
            ),
            config.weights,
            config.default_risk,
            config.infeasible_penalty,
        )
    }

    /// Weighted objective of a selection
    pub fn objective(&self, problem: &ReductionProblem, picks: &[usize]) -> f64 {
        let totals = problem.totals(picks, self.default_risk);
        if totals.cost > problem.budget() {
            return self.infeasible_penalty;
        }

        let reduction = safe_ratio(totals.reduction, problem.total_potential_reduction());
        let cost = safe_ratio(totals.cost, problem.budget());
        let risk = safe_ratio(totals.risk, problem.len() as f64);
        -self.weights.reduction * reduction + self.weights.cost * cost + self.weights.risk * risk
    }
}

impl Default for MultiObjectiveStrategy {
    fn default() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }
}

impl OptimizationStrategy for MultiObjectiveStrategy {
    fn name(&self) -> &str {
        "multi_objective"
    }

    fn optimize(&self, problem: &ReductionProblem) -> Result<OptimizationResult> {
        let outcome = self
            .search
            .minimize(problem.len(), |x| self.objective(problem, &decode(x)));
        if !outcome.value.is_finite() {
            return Ok(OptimizationResult::failure(
                self.name(),
                "search produced a non-finite objective",
            ));
        }

        let mut picks = decode(&outcome.best);
        problem.repair(&mut picks);
        let totals = problem.totals(&picks, self.default_risk);
        debug!(
            evaluations = outcome.evaluations,
            objective = outcome.value,
            selected = picks.len(),
            "Multi-objective search finished"
        );

        let mut result = OptimizationResult::from_picks(self.name(), problem, &picks)
            .with_objective(self.objective(problem, &picks))
            .with_risk(totals.risk);
        for selected in &mut result.selected_initiatives {
            selected.risk_score = Some(problem.risk(selected.index, self.default_risk));
        }
        Ok(result)
    }

    fn describe(&self) -> String {
        format!(
            "weights={:.2}/{:.2}/{:.2} default_risk={}",
            self.weights.reduction, self.weights.cost, self.weights.risk, self.default_risk
        )
    }
}
