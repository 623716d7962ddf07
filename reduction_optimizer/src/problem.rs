//! Validated optimisation problem

use crate::initiative::Initiative;
use crate::utils::safe_ratio;
use crate::{OptimizerError, Result};
use serde::{Deserialize, Serialize};

/// Initiative catalog with its budget and reduction target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionProblem {
    initiatives: Vec<Initiative>,
    budget: f64,
    target: f64,
    ratios: Vec<f64>,
}

/// Overview returned when a problem is defined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub num_initiatives: usize,
    pub total_potential_reduction: f64,
    pub total_cost_if_all: f64,
    /// Reduction per unit cost, in catalog order
    pub cost_effectiveness_ratios: Vec<f64>,
}

/// Cost, reduction and risk of a selection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionTotals {
    pub cost: f64,
    pub reduction: f64,
    pub risk: f64,
}

impl ReductionProblem {
    /// Validate the catalog and constraints
    ///
    /// Every initiative needs a finite positive cost, a finite non-negative reduction
    /// and, when present, a risk score in `[0, 1]`.
    pub fn new(initiatives: Vec<Initiative>, budget: f64, target: f64) -> Result<Self> {
        if initiatives.is_empty() {
            return Err(OptimizerError::EmptyCatalog);
        }
        for initiative in &initiatives {
            if !(initiative.cost.is_finite() && initiative.cost > 0.0) {
                return Err(OptimizerError::InvalidCost {
                    name: initiative.name.clone(),
                    cost: initiative.cost,
                });
            }
            if !(initiative.co2_reduction.is_finite() && initiative.co2_reduction >= 0.0) {
                return Err(OptimizerError::InvalidReduction {
                    name: initiative.name.clone(),
                    reduction: initiative.co2_reduction,
                });
            }
            if let Some(risk) = initiative.risk_score {
                if !(0.0..=1.0).contains(&risk) {
                    return Err(OptimizerError::InvalidRisk {
                        name: initiative.name.clone(),
                        risk,
                    });
                }
            }
        }
        if !(budget.is_finite() && budget > 0.0) {
            return Err(OptimizerError::InvalidBudget(budget));
        }
        if !(target.is_finite() && target > 0.0) {
            return Err(OptimizerError::InvalidTarget(target));
        }

        let ratios = initiatives.iter().map(Initiative::cost_effectiveness).collect();
        Ok(Self {
            initiatives,
            budget,
            target,
            ratios,
        })
    }

    pub fn summary(&self) -> ProblemSummary {
        ProblemSummary {
            num_initiatives: self.initiatives.len(),
            total_potential_reduction: self.total_potential_reduction(),
            total_cost_if_all: self.initiatives.iter().map(|i| i.cost).sum(),
            cost_effectiveness_ratios: self.ratios.clone(),
        }
    }

    pub fn initiatives(&self) -> &[Initiative] {
        &self.initiatives
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Reduction per unit cost, in catalog order
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub fn len(&self) -> usize {
        self.initiatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initiatives.is_empty()
    }

    pub fn total_potential_reduction(&self) -> f64 {
        self.initiatives.iter().map(|i| i.co2_reduction).sum()
    }

    /// Risk of an initiative, `default_risk` when it carries none
    pub fn risk(&self, index: usize, default_risk: f64) -> f64 {
        self.initiatives[index].risk_score.unwrap_or(default_risk)
    }

    /// Totals of the initiatives at `picks`
    pub fn totals(&self, picks: &[usize], default_risk: f64) -> SelectionTotals {
        picks.iter().fold(SelectionTotals::default(), |acc, &i| SelectionTotals {
            cost: acc.cost + self.initiatives[i].cost,
            reduction: acc.reduction + self.initiatives[i].co2_reduction,
            risk: acc.risk + self.risk(i, default_risk),
        })
    }

    /// Drop the least cost-effective picks until the selection fits the budget
    pub fn repair(&self, picks: &mut Vec<usize>) {
        while self.totals(picks, 0.0).cost > self.budget {
            let Some(position) = picks
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| self.ratios[**a].total_cmp(&self.ratios[**b]))
                .map(|(position, _)| position)
            else {
                break;
            };
            picks.remove(position);
        }
    }

    pub(crate) fn budget_utilization(&self, cost: f64) -> f64 {
        safe_ratio(cost, self.budget)
    }

    pub(crate) fn target_achievement(&self, reduction: f64) -> f64 {
        safe_ratio(reduction, self.target)
    }
}
