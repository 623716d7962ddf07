//! Strategy registry and run comparison

use crate::config::OptimizerConfig;
use crate::initiative::Initiative;
use crate::problem::{ProblemSummary, ReductionProblem};
use crate::result::OptimizationResult;
use crate::strategies::{
    CostEffectivenessStrategy, GeneticAlgorithmStrategy, LinearProgrammingStrategy,
    MultiObjectiveStrategy, OptimizationStrategy,
};
use crate::{OptimizerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Weight of target achievement in the best-method score; the rest rewards unspent budget
const ACHIEVEMENT_WEIGHT: f64 = 0.7;
/// Budget utilization below which a method is flagged as leaving money unspent
const LOW_UTILIZATION: f64 = 0.8;

/// Comparable metrics of one successful method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodComparison {
    pub total_reduction: f64,
    pub total_cost: f64,
    pub budget_utilization: f64,
    pub target_achievement: f64,
    pub num_initiatives: usize,
}

/// Outcome of running every registered strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// One result per strategy, in registry order
    pub optimization_results: Vec<OptimizationResult>,
    pub best_method: String,
    pub best_score: f64,
    pub comparison: BTreeMap<String, MethodComparison>,
    pub recommendations: Vec<String>,
}

impl OptimizationReport {
    /// Result of a named method
    pub fn result(&self, method: &str) -> Option<&OptimizationResult> {
        self.optimization_results.iter().find(|r| r.method == method)
    }
}

/// Selection engine holding the problem definition and strategy registry
pub struct ReductionOptimizer {
    config: OptimizerConfig,
    problem: Option<ReductionProblem>,
    strategies: Vec<Box<dyn OptimizationStrategy>>,
}

impl ReductionOptimizer {
    /// Create a new optimizer with the four built-in strategies
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        let strategies: Vec<Box<dyn OptimizationStrategy>> = vec![
            Box::new(CostEffectivenessStrategy::new()),
            Box::new(LinearProgrammingStrategy::new(config.implementation_threshold)),
            Box::new(GeneticAlgorithmStrategy::from_config(&config)),
            Box::new(MultiObjectiveStrategy::from_config(&config)),
        ];
        Ok(Self {
            config,
            problem: None,
            strategies,
        })
    }

    /// Append a strategy to the registry
    pub fn register(&mut self, strategy: Box<dyn OptimizationStrategy>) {
        self.strategies.push(strategy);
    }

    /// Validate and store the problem, replacing any previous one
    pub fn define_problem(
        &mut self,
        initiatives: Vec<Initiative>,
        budget: f64,
        target: f64,
    ) -> Result<ProblemSummary> {
        let problem = ReductionProblem::new(initiatives, budget, target)?;
        let summary = problem.summary();
        info!(
            initiatives = summary.num_initiatives,
            budget,
            target,
            total_potential_reduction = summary.total_potential_reduction,
            "Optimization problem defined"
        );
        self.problem = Some(problem);
        Ok(summary)
    }

    pub fn problem(&self) -> Option<&ReductionProblem> {
        self.problem.as_ref()
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Names of the registered strategies
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run a single named strategy
    pub fn run_strategy(&self, name: &str) -> Result<OptimizationResult> {
        let problem = self.problem.as_ref().ok_or(OptimizerError::ProblemNotDefined)?;
        let strategy = self
            .strategies
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| OptimizerError::UnknownStrategy(name.to_string()))?;
        Ok(run_checked(strategy.as_ref(), problem))
    }

    /// Run every strategy and pick the best successful one
    pub fn run_all(&self) -> Result<OptimizationReport> {
        let problem = self.problem.as_ref().ok_or(OptimizerError::ProblemNotDefined)?;

        let results: Vec<OptimizationResult> = self
            .strategies
            .iter()
            .map(|strategy| {
                info!(method = strategy.name(), "Running optimization");
                run_checked(strategy.as_ref(), problem)
            })
            .collect();

        let mut best: Option<(&OptimizationResult, f64)> = None;
        for result in results.iter().filter(|r| r.success) {
            let score = ACHIEVEMENT_WEIGHT * result.target_achievement
                + (1.0 - ACHIEVEMENT_WEIGHT) * (1.0 - result.budget_utilization);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((result, score));
            }
        }
        let Some((best_result, best_score)) = best else {
            return Err(OptimizerError::AllStrategiesFailed(
                results
                    .iter()
                    .map(|r| format!("{}: {}", r.method, r.message.as_deref().unwrap_or("failed")))
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        };
        let best_method = best_result.method.clone();

        info!(best_method = %best_method, best_score, "Optimization complete");
        Ok(OptimizationReport {
            comparison: compare_methods(&results),
            recommendations: recommendations(&results),
            best_method,
            best_score,
            optimization_results: results,
        })
    }
}

/// Run a strategy, turning errors and budget violations into failed results
fn run_checked(strategy: &dyn OptimizationStrategy, problem: &ReductionProblem) -> OptimizationResult {
    match strategy.optimize(problem) {
        Ok(result) if result.success && result.total_cost > problem.budget() => {
            warn!(
                method = strategy.name(),
                total_cost = result.total_cost,
                budget = problem.budget(),
                "Successful result exceeded the budget"
            );
            OptimizationResult::failure(
                strategy.name(),
                format!(
                    "total cost {:.2} exceeds budget {:.2}",
                    result.total_cost,
                    problem.budget()
                ),
            )
        }
        Ok(result) => result,
        Err(err) => {
            warn!(
                method = strategy.name(),
                parameters = %strategy.describe(),
                error = %err,
                "Optimization strategy failed"
            );
            OptimizationResult::failure(strategy.name(), err.to_string())
        }
    }
}

fn compare_methods(results: &[OptimizationResult]) -> BTreeMap<String, MethodComparison> {
    results
        .iter()
        .filter(|r| r.success)
        .map(|r| {
            (
                r.method.clone(),
                MethodComparison {
                    total_reduction: r.total_reduction,
                    total_cost: r.total_cost,
                    budget_utilization: r.budget_utilization,
                    target_achievement: r.target_achievement,
                    num_initiatives: r.selected_initiatives.len(),
                },
            )
        })
        .collect()
}

fn recommendations(results: &[OptimizationResult]) -> Vec<String> {
    let mut recommendations = Vec::new();

    let mut top: Option<&OptimizationResult> = None;
    for result in results.iter().filter(|r| r.success) {
        if result.total_reduction > top.map_or(0.0, |t| t.total_reduction) {
            top = Some(result);
        }
    }
    if let Some(result) = top {
        recommendations.push(format!(
            "For maximum carbon reduction, use {} method achieving {:.1} tonnes CO2e reduction",
            result.method, result.total_reduction
        ));
    }

    for result in results.iter().filter(|r| r.success) {
        if result.budget_utilization < LOW_UTILIZATION {
            recommendations.push(format!(
                "{} method uses only {:.1}% of budget - consider additional initiatives",
                result.method,
                result.budget_utilization * 100.0
            ));
        }
    }
    recommendations
}

impl std::fmt::Debug for ReductionOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReductionOptimizer")
            .field("config", &self.config)
            .field("problem", &self.problem)
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
