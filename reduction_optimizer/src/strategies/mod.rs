//! Selection strategies
//!
//! Strategies are organized by approach:
//! - Greedy ranking by cost-effectiveness
//! - Exact solution of the continuous relaxation
//! - Seeded differential evolution, single and multi-objective

pub mod evolution;
pub mod greedy;
pub mod multi_objective;
pub mod relaxation;

use crate::problem::ReductionProblem;
use crate::result::OptimizationResult;
use crate::Result;

// Re-export all strategies for convenient access
pub use evolution::{DifferentialEvolution, GeneticAlgorithmStrategy};
pub use greedy::CostEffectivenessStrategy;
pub use multi_objective::MultiObjectiveStrategy;
pub use relaxation::LinearProgrammingStrategy;

/// Trait defining an initiative selection strategy
pub trait OptimizationStrategy: Send + Sync {
    /// Get the name of the strategy
    fn name(&self) -> &str;

    /// Select initiatives for a validated problem
    ///
    /// An infeasible or numerically broken search is a result with `success = false`;
    /// errors are reserved for failures of the strategy itself.
    fn optimize(&self, problem: &ReductionProblem) -> Result<OptimizationResult>;

    /// Parameters reported alongside failures
    fn describe(&self) -> String {
        String::new()
    }
}
