//! Strategy outcomes

use crate::problem::ReductionProblem;
use crate::utils::safe_ratio;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One initiative in a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedInitiative {
    /// Position in the catalog
    pub index: usize,
    pub name: String,
    /// Cost attributed to the selection, scaled by the implementation level
    pub cost: f64,
    /// Reduction attributed to the selection, scaled by the implementation level
    pub reduction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    /// Fraction implemented, reported by the continuous relaxation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band a mean risk score
    pub fn from_mean_risk(mean: f64) -> Self {
        if mean < 0.3 {
            RiskLevel::Low
        } else if mean < 0.7 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Outcome of one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub method: String,
    pub success: bool,
    pub selected_initiatives: Vec<SelectedInitiative>,
    pub total_cost: f64,
    pub total_reduction: f64,
    pub budget_utilization: f64,
    pub target_achievement: f64,
    pub average_cost_per_tonne: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_risk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OptimizationResult {
    /// Successful result over the given selection; totals are derived from it
    pub fn from_selection(
        method: impl Into<String>,
        problem: &ReductionProblem,
        selected_initiatives: Vec<SelectedInitiative>,
    ) -> Self {
        let total_cost = selected_initiatives.iter().fold(0.0, |acc, s| acc + s.cost);
        let total_reduction = selected_initiatives
            .iter()
            .fold(0.0, |acc, s| acc + s.reduction);
        Self {
            method: method.into(),
            success: true,
            selected_initiatives,
            total_cost,
            total_reduction,
            budget_utilization: problem.budget_utilization(total_cost),
            target_achievement: problem.target_achievement(total_reduction),
            average_cost_per_tonne: safe_ratio(total_cost, total_reduction),
            objective_value: None,
            total_risk: None,
            risk_level: None,
            message: None,
        }
    }

    /// Successful result selecting whole initiatives at `picks`
    pub fn from_picks(method: impl Into<String>, problem: &ReductionProblem, picks: &[usize]) -> Self {
        let selected = picks
            .iter()
            .map(|&index| {
                let initiative = &problem.initiatives()[index];
                SelectedInitiative {
                    index,
                    name: initiative.name.clone(),
                    cost: initiative.cost,
                    reduction: initiative.co2_reduction,
                    ratio: Some(problem.ratios()[index]),
                    implementation_level: None,
                    risk_score: initiative.risk_score,
                }
            })
            .collect();
        Self::from_selection(method, problem, selected)
    }

    /// Failed result carrying no selection
    pub fn failure(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            success: false,
            selected_initiatives: Vec::new(),
            total_cost: 0.0,
            total_reduction: 0.0,
            budget_utilization: 0.0,
            target_achievement: 0.0,
            average_cost_per_tonne: 0.0,
            objective_value: None,
            total_risk: None,
            risk_level: None,
            message: Some(message.into()),
        }
    }

    pub fn with_objective(mut self, value: f64) -> Self {
        self.objective_value = Some(value);
        self
    }

    /// Attach total risk and the band of the mean selected risk
    pub fn with_risk(mut self, total_risk: f64) -> Self {
        let mean = safe_ratio(total_risk, self.selected_initiatives.len() as f64);
        self.total_risk = Some(total_risk);
        self.risk_level = Some(RiskLevel::from_mean_risk(mean));
        self
    }

    /// Whether every reported number is finite
    pub fn is_finite(&self) -> bool {
        [
            self.total_cost,
            self.total_reduction,
            self.budget_utilization,
            self.target_achievement,
            self.average_cost_per_tonne,
        ]
        .iter()
        .chain(self.objective_value.iter())
        .all(|v| v.is_finite())
    }

    /// Names of the selected initiatives, in selection order
    pub fn selected_names(&self) -> Vec<&str> {
        self.selected_initiatives.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_bands() {
        assert_eq!(RiskLevel::from_mean_risk(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_mean_risk(0.3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_mean_risk(0.7), RiskLevel::High);
    }

    #[test]
    fn test_failure_carries_no_selection() {
        let result = OptimizationResult::failure("linear_programming", "solver diverged");
        assert!(!result.success);
        assert!(result.selected_initiatives.is_empty());
        assert_eq!(result.message.as_deref(), Some("solver diverged"));
    }

    #[test]
    fn test_empty_selection_totals_are_positive_zero() {
        use crate::initiative::Initiative;

        let problem = ReductionProblem::new(
            vec![Initiative::new("Heat recovery", 900_000.0, 300.0)],
            100_000.0,
            50.0,
        )
        .unwrap();
        let result = OptimizationResult::from_selection("cost_effectiveness", &problem, Vec::new());

        assert!(result.total_cost.is_sign_positive());
        assert!(result.total_reduction.is_sign_positive());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total_cost"].to_string(), "0.0");
    }
}
