//! Error types for the scenario_projector crate

use emission_core::CoreError;
use thiserror::Error;

/// Custom error types for the scenario_projector crate
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario requested before a baseline exists
    #[error("Baseline scenario must be created first")]
    BaselineMissing,

    #[error("Invalid emissions profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid intervention '{name}': {reason}")]
    InvalidIntervention { name: String, reason: String },

    /// Target reduction fraction outside `(0, 1]`
    #[error("Target reduction must be in (0, 1], got {0}")]
    InvalidTarget(f64),

    #[error("Target year {target_year} must fall within {epoch_year} + 1..={epoch_year} + {timeline_years}")]
    InvalidTargetYear {
        target_year: i32,
        epoch_year: i32,
        timeline_years: u32,
    },

    #[error("Unknown target strategy: {0}")]
    UnknownStrategy(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Name collides with the baseline row of comparisons
    #[error("Scenario name '{0}' is reserved")]
    ReservedName(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Perturbation distribution could not be built
    #[error("Sampling error: {0}")]
    Sampling(String),

    /// Error from series handling
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ScenarioError>;
