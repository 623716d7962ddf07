//! # Scenario Projector
//!
//! Multi-year "what-if" projections of company emissions.
//!
//! ## Features
//!
//! - Business-as-usual baseline from growth and efficiency assumptions
//! - Intervention overlays with linear ramp-up, geometric decay and one-time reductions
//! - Impact metrics against the baseline: reduction, cost per tonne, NPV, payback
//! - Target scenarios that rank a reference catalog and score feasibility
//! - Scenario comparison with per-axis leaders and trade-off statements
//! - Optional seeded uncertainty and a separate Monte-Carlo sampling pass
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scenario_projector::{
//!     EmissionsProfile, Intervention, ScenarioConfig, ScenarioProjector, TargetStrategy,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut projector = ScenarioProjector::new(ScenarioConfig::default())?;
//! projector.create_baseline(EmissionsProfile::new(10_000.0).with_epoch_year(2025))?;
//!
//! projector.create_intervention_scenario(
//!     "Solar",
//!     vec![Intervention::new("Rooftop solar", 0.15, 200_000.0)],
//! )?;
//! let target = projector.create_target_scenario(0.5, 2031, TargetStrategy::CostEffective)?;
//! println!("{:?}", target.feasibility_analysis);
//!
//! let comparison = projector.compare_scenarios(&[])?;
//! println!("{:?}", comparison.trade_offs);
//! # Ok(())
//! # }
//! ```

pub mod comparison;
pub mod config;
pub mod error;
pub mod impact;
pub mod intervention;
pub mod profile;
pub mod projection;
pub mod projector;
pub mod sampling;
pub mod scenario;
pub mod target;

// Re-export commonly used types
pub use crate::comparison::{BestScenarios, ScenarioComparison, ScenarioMetrics};
pub use crate::config::{ScenarioConfig, UncertaintyMode};
pub use crate::error::{Result, ScenarioError};
pub use crate::impact::{ImpactMetrics, Payback};
pub use crate::intervention::{Intervention, InterventionKind};
pub use crate::profile::EmissionsProfile;
pub use crate::projection::{InterventionEffect, Projection, ProjectionSummary};
pub use crate::projector::ScenarioProjector;
pub use crate::sampling::MonteCarloSummary;
pub use crate::scenario::{Scenario, ScenarioKind};
pub use crate::target::{FeasibilityReport, RiskBand, TargetSpec, TargetStrategy};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
