//! Target-driven intervention selection and feasibility

use crate::error::{Result, ScenarioError};
use crate::intervention::{Intervention, InterventionKind};
use crate::projection::Projection;
use emission_core::stats::{mean, safe_ratio};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordering applied to the reference catalog before greedy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetStrategy {
    /// Cost per unit of annual reduction, ascending
    #[default]
    CostEffective,
    /// Annual reduction, descending
    HighImpact,
    /// Annual reduction per ramp year, descending
    QuickWins,
}

impl TargetStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStrategy::CostEffective => "cost_effective",
            TargetStrategy::HighImpact => "high_impact",
            TargetStrategy::QuickWins => "quick_wins",
        }
    }

    fn compare(&self, a: &Intervention, b: &Intervention) -> Ordering {
        match self {
            TargetStrategy::CostEffective => cost_per_reduction(a).total_cmp(&cost_per_reduction(b)),
            TargetStrategy::HighImpact => b.annual_reduction.total_cmp(&a.annual_reduction),
            TargetStrategy::QuickWins => quick_win_score(b).total_cmp(&quick_win_score(a)),
        }
    }
}

fn cost_per_reduction(intervention: &Intervention) -> f64 {
    if intervention.annual_reduction > 0.0 {
        intervention.cost / intervention.annual_reduction
    } else {
        f64::INFINITY
    }
}

fn quick_win_score(intervention: &Intervention) -> f64 {
    intervention.annual_reduction / f64::from(intervention.ramp_duration.max(1))
}

impl fmt::Display for TargetStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetStrategy {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost_effective" => Ok(TargetStrategy::CostEffective),
            "high_impact" => Ok(TargetStrategy::HighImpact),
            "quick_wins" => Ok(TargetStrategy::QuickWins),
            other => Err(ScenarioError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Built-in intervention catalog used when none is supplied
pub fn reference_catalog() -> Vec<Intervention> {
    vec![
        Intervention::new("LED Lighting Upgrade", 0.05, 50_000.0),
        Intervention::new("Solar Panel Installation", 0.15, 200_000.0)
            .with_kind(InterventionKind::Renewable),
        Intervention::new("HVAC Optimization", 0.08, 75_000.0),
        Intervention::new("Electric Vehicle Fleet", 0.12, 150_000.0)
            .with_kind(InterventionKind::Transportation)
            .with_ramp(2),
        Intervention::new("Building Insulation", 0.10, 100_000.0),
    ]
}

/// Catalog entries in strategy order; ties keep catalog order
pub fn rank_catalog<'a>(catalog: &'a [Intervention], strategy: TargetStrategy) -> Vec<&'a Intervention> {
    let mut ranked: Vec<&Intervention> = catalog.iter().collect();
    ranked.sort_by(|a, b| strategy.compare(a, b));
    ranked
}

/// Interventions chosen to reach a reduction target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSelection {
    pub interventions: Vec<Intervention>,
    /// Sum of the selected annual reduction fractions
    pub potential_reduction: f64,
    pub budget_used: f64,
}

/// Greedily accept ranked interventions under `budget_ceiling` until the summed
/// potential reaches `target_fraction`
///
/// Accepted interventions start in consecutive years 1, 2, ….
pub fn select_for_target(
    catalog: &[Intervention],
    target_fraction: f64,
    strategy: TargetStrategy,
    budget_ceiling: f64,
) -> TargetSelection {
    let mut selection = TargetSelection {
        interventions: Vec::new(),
        potential_reduction: 0.0,
        budget_used: 0.0,
    };

    for candidate in rank_catalog(catalog, strategy) {
        if selection.potential_reduction >= target_fraction {
            break;
        }
        if selection.budget_used + candidate.cost <= budget_ceiling {
            let offset = selection.interventions.len() as u32 + 1;
            selection.interventions.push(
                candidate
                    .clone()
                    .starting_at(offset)
                    .with_rationale(format!("Selected for {} strategy", strategy)),
            );
            selection.potential_reduction += candidate.annual_reduction;
            selection.budget_used += candidate.cost;
        }
    }
    selection
}

/// Target attached to a target scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Fraction of current emissions to remove
    pub target_reduction: f64,
    pub target_year: i32,
    pub years_to_target: u32,
    /// Current emissions scaled by `1 - target_reduction`
    pub target_emissions: f64,
    /// Average fraction to remove per year
    pub required_annual_rate: f64,
    pub strategy: TargetStrategy,
}

impl TargetSpec {
    /// Validate a target against the projection horizon
    pub fn new(
        target_reduction: f64,
        target_year: i32,
        epoch_year: i32,
        timeline_years: u32,
        current_emissions: f64,
        strategy: TargetStrategy,
    ) -> Result<Self> {
        if !(target_reduction.is_finite() && target_reduction > 0.0 && target_reduction <= 1.0) {
            return Err(ScenarioError::InvalidTarget(target_reduction));
        }
        let years_to_target = i64::from(target_year) - i64::from(epoch_year);
        if years_to_target < 1 || years_to_target > i64::from(timeline_years) {
            return Err(ScenarioError::InvalidTargetYear {
                target_year,
                epoch_year,
                timeline_years,
            });
        }
        let years_to_target = years_to_target as u32;

        Ok(Self {
            target_reduction,
            target_year,
            years_to_target,
            target_emissions: current_emissions * (1.0 - target_reduction),
            required_annual_rate: target_reduction / f64::from(years_to_target),
            strategy,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskBand::Low => write!(f, "low"),
            RiskBand::Medium => write!(f, "medium"),
            RiskBand::High => write!(f, "high"),
        }
    }
}

/// Longest mean ramp that still counts as low risk
const LOW_RISK_MAX_RAMP: f64 = 2.0;
/// Feasibility score from which risk is at most medium
const MEDIUM_RISK_MIN_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    /// `min(potential / target, 1)`
    pub feasibility_score: f64,
    pub is_achievable: bool,
    pub total_potential_reduction: f64,
    pub target_reduction: f64,
    /// Missing fraction, 0 when the potential covers the target
    pub reduction_gap: f64,
    pub risk_level: RiskBand,
    /// Mean ramp duration of the selected interventions, years
    pub mean_implementation_duration: f64,
    pub projected_target_year_emissions: f64,
    pub target_emissions: f64,
    /// Projected emissions in the target year are at or below the target
    pub on_track: bool,
    pub total_cost: f64,
    pub recommendations: Vec<String>,
}

impl FeasibilityReport {
    pub fn assess(
        target_spec: &TargetSpec,
        selection: &TargetSelection,
        projection: &Projection,
        achievable_threshold: f64,
    ) -> Self {
        let potential = selection.potential_reduction;
        let score = safe_ratio(potential, target_spec.target_reduction).min(1.0);
        let is_achievable = score >= achievable_threshold;
        let gap = (target_spec.target_reduction - potential).max(0.0);

        let ramps: Vec<f64> = selection
            .interventions
            .iter()
            .map(|i| f64::from(i.ramp_duration))
            .collect();
        let mean_ramp = mean(&ramps);
        let risk_level = if score >= achievable_threshold && mean_ramp <= LOW_RISK_MAX_RAMP {
            RiskBand::Low
        } else if score >= MEDIUM_RISK_MIN_SCORE {
            RiskBand::Medium
        } else {
            RiskBand::High
        };

        let projected = projection
            .emissions
            .get(target_spec.years_to_target as usize)
            .copied()
            .unwrap_or(0.0);
        let on_track = projected <= target_spec.target_emissions;

        let mut recommendations = Vec::new();
        if is_achievable {
            recommendations.push(format!(
                "Target is achievable with {} selected interventions",
                selection.interventions.len()
            ));
        } else {
            recommendations.push(format!(
                "Additional {:.1}% annual reduction potential needed to reach the target",
                gap * 100.0
            ));
        }
        if !on_track {
            recommendations.push(format!(
                "Projected {} emissions of {:.1} tonnes exceed the target of {:.1} tonnes - consider earlier implementation",
                target_spec.target_year, projected, target_spec.target_emissions
            ));
        }
        if risk_level == RiskBand::High {
            recommendations
                .push("High implementation risk - consider a later target year or a larger budget".to_string());
        }
        if mean_ramp > LOW_RISK_MAX_RAMP {
            recommendations.push(format!(
                "Mean implementation time of {:.1} years delays full effect",
                mean_ramp
            ));
        }

        Self {
            feasibility_score: score,
            is_achievable,
            total_potential_reduction: potential,
            target_reduction: target_spec.target_reduction,
            reduction_gap: gap,
            risk_level,
            mean_implementation_duration: mean_ramp,
            projected_target_year_emissions: projected,
            target_emissions: target_spec.target_emissions,
            on_track,
            total_cost: selection.budget_used,
            recommendations,
        }
    }
}
