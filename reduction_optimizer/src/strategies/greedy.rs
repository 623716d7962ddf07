//! Greedy cost-effectiveness strategy

use super::OptimizationStrategy;
use crate::problem::ReductionProblem;
use crate::result::OptimizationResult;
use crate::utils::rank_descending;
use crate::Result;

/// Accept initiatives in order of reduction per unit cost while the budget allows
///
/// Ties keep catalog order, so identical inputs always give the same selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostEffectivenessStrategy;

impl CostEffectivenessStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Catalog indices accepted by the greedy pass, in acceptance order
    pub fn select(problem: &ReductionProblem) -> Vec<usize> {
        let mut picks = Vec::new();
        let mut spent = 0.0;
        for index in rank_descending(problem.ratios()) {
            let cost = problem.initiatives()[index].cost;
            if spent + cost <= problem.budget() {
                spent += cost;
                picks.push(index);
            }
        }
        picks
    }
}

impl OptimizationStrategy for CostEffectivenessStrategy {
    fn name(&self) -> &str {
        "cost_effectiveness"
    }

    fn optimize(&self, problem: &ReductionProblem) -> Result<OptimizationResult> {
        let picks = Self::select(problem);
        Ok(OptimizationResult::from_picks(self.name(), problem, &picks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Initiative;

    #[test]
    fn test_nothing_fits() {
        let problem = ReductionProblem::new(
            vec![Initiative::new("Chiller upgrade", 500.0, 10.0)],
            100.0,
            5.0,
        )
        .unwrap();
        let result = CostEffectivenessStrategy::new().optimize(&problem).unwrap();
        assert!(result.success);
        assert!(result.selected_initiatives.is_empty());
        assert_eq!(result.average_cost_per_tonne, 0.0);
    }
}
