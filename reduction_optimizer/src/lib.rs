//! # Reduction Optimizer
//!
//! `reduction_optimizer` selects carbon reduction initiatives under a budget.
//!
//! ## Strategy Categories
//!
//! Four independent strategies produce comparable results:
//!
//! - **cost_effectiveness**: greedy ranking by tonnes CO2e per unit cost
//! - **linear_programming**: exact solution of the continuous relaxation
//! - **genetic_algorithm**: seeded differential evolution over binary selections
//! - **multi_objective**: the same search over a weighted reduction, cost and risk score
//!
//! The [`recommendations`] module ranks a reference catalog against a company profile
//! instead of a budget.
//!
//! ## Usage Example
//!
//! ```no_run
//! use reduction_optimizer::{Initiative, OptimizerConfig, ReductionOptimizer};
//!
//! let mut optimizer = ReductionOptimizer::new(OptimizerConfig::default())?;
//! optimizer.define_problem(
//!     vec![
//!         Initiative::new("LED retrofit", 50_000.0, 100.0),
//!         Initiative::new("Solar array", 200_000.0, 500.0),
//!     ],
//!     300_000.0,
//!     400.0,
//! )?;
//!
//! let report = optimizer.run_all()?;
//! println!("Best method: {}", report.best_method);
//! # Ok::<(), reduction_optimizer::OptimizerError>(())
//! ```

use thiserror::Error;

pub mod config;
pub mod initiative;
pub mod optimizer;
pub mod problem;
pub mod recommendations;
pub mod result;
pub mod strategies;
pub mod utils;

// Re-export commonly used types
pub use config::{ObjectiveWeights, OptimizerConfig};
pub use initiative::Initiative;
pub use optimizer::{MethodComparison, OptimizationReport, ReductionOptimizer};
pub use problem::{ProblemSummary, ReductionProblem};
pub use recommendations::{
    CatalogEntry, CompanyProfile, Recommendation, RecommendationConfig, RecommendationEngine,
    RecommendationReport,
};
pub use result::{OptimizationResult, RiskLevel, SelectedInitiative};
pub use strategies::{
    CostEffectivenessStrategy, DifferentialEvolution, GeneticAlgorithmStrategy,
    LinearProgrammingStrategy, MultiObjectiveStrategy, OptimizationStrategy,
};

/// Errors that can occur in reduction optimization
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Initiative catalog is empty")]
    EmptyCatalog,

    #[error("Invalid cost for initiative '{name}': {cost}")]
    InvalidCost { name: String, cost: f64 },

    #[error("Invalid reduction for initiative '{name}': {reduction}")]
    InvalidReduction { name: String, reduction: f64 },

    #[error("Invalid risk score for initiative '{name}': {risk}")]
    InvalidRisk { name: String, risk: f64 },

    #[error("Budget must be positive, got {0}")]
    InvalidBudget(f64),

    #[error("Target reduction must be positive, got {0}")]
    InvalidTarget(f64),

    #[error("Invalid objective weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No optimization problem has been defined")]
    ProblemNotDefined,

    #[error("No initiative catalog has been loaded")]
    CatalogNotLoaded,

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Strategy calculation error: {0}")]
    CalculationError(String),

    #[error("All strategies failed: {0}")]
    AllStrategiesFailed(String),
}

/// Result type for optimizer operations
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Version of the reduction_optimizer crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
