//! Continuous relaxation of the selection problem
//!
//! Maximise `Σ reduction·x` subject to `Σ cost·x ≤ budget` and `0 ≤ x ≤ 1`. With a
//! single budget row the optimum is Dantzig's: fill by descending ratio and take a
//! fraction of the first initiative that no longer fits.

use super::OptimizationStrategy;
use crate::problem::ReductionProblem;
use crate::result::{OptimizationResult, SelectedInitiative};
use crate::utils::rank_descending;
use crate::Result;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct LinearProgrammingStrategy {
    /// Levels at or below this are not reported
    implementation_threshold: f64,
}

impl LinearProgrammingStrategy {
    /// Create a new relaxation strategy
    pub fn new(implementation_threshold: f64) -> Self {
        Self {
            implementation_threshold,
        }
    }

    /// Optimal implementation level per initiative, in catalog order
    pub fn solve(problem: &ReductionProblem) -> Vec<f64> {
        let mut levels = vec![0.0; problem.len()];
        let mut remaining = problem.budget();
        for index in rank_descending(problem.ratios()) {
            let initiative = &problem.initiatives()[index];
            // Zero-reduction initiatives cannot improve the objective
            if initiative.co2_reduction <= 0.0 || remaining <= 0.0 {
                break;
            }
            if initiative.cost <= remaining {
                levels[index] = 1.0;
                remaining -= initiative.cost;
            } else {
                levels[index] = remaining / initiative.cost;
                remaining = 0.0;
            }
        }
        levels
    }
}

impl Default for LinearProgrammingStrategy {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl OptimizationStrategy for LinearProgrammingStrategy {
    fn name(&self) -> &str {
        "linear_programming"
    }

    fn optimize(&self, problem: &ReductionProblem) -> Result<OptimizationResult> {
        let levels = Self::solve(problem);
        let objective: f64 = levels
            .iter()
            .zip(problem.initiatives())
            .map(|(x, i)| x * i.co2_reduction)
            .sum();

        let selected: Vec<SelectedInitiative> = levels
            .iter()
            .enumerate()
            .filter(|(_, level)| **level > self.implementation_threshold)
            .map(|(index, &level)| {
                let initiative = &problem.initiatives()[index];
                SelectedInitiative {
                    index,
                    name: initiative.name.clone(),
                    cost: level * initiative.cost,
                    reduction: level * initiative.co2_reduction,
                    ratio: Some(problem.ratios()[index]),
                    implementation_level: Some(level),
                    risk_score: initiative.risk_score,
                }
            })
            .collect();

        let mut result =
            OptimizationResult::from_selection(self.name(), problem, selected).with_objective(objective);
        // The fractional level fills the remaining budget exactly; absorb rounding
        if result.total_cost > problem.budget() {
            result.total_cost = problem.budget();
            result.budget_utilization = 1.0;
        }

        if !result.is_finite() {
            return Ok(OptimizationResult::failure(
                self.name(),
                "relaxation produced non-finite values",
            ));
        }
        debug!(objective, selected = result.selected_initiatives.len(), "Relaxation solved");
        Ok(result)
    }

    fn describe(&self) -> String {
        format!("implementation_threshold={}", self.implementation_threshold)
    }
}
