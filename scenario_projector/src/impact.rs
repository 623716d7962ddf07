//! Impact of a scenario against the baseline

use crate::config::ScenarioConfig;
use crate::projection::Projection;
use emission_core::stats::{argmax, mean, safe_ratio};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Years until cumulative carbon savings cover cumulative cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    /// Projection year (offset from the epoch) in which the cost is recovered
    Year(u32),
    Never,
}

impl fmt::Display for Payback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payback::Year(year) => write!(f, "{} years", year),
            Payback::Never => write!(f, "never"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub total_emission_reduction: f64,
    pub reduction_percentage: f64,
    pub average_annual_reduction: f64,
    pub peak_reduction: f64,
    /// Calendar year of the largest annual reduction
    pub peak_reduction_year: i32,
    pub total_intervention_cost: f64,
    /// Cost per avoided tonne, 0 without a positive reduction
    pub cost_per_tonne_co2: f64,
    pub annual_reductions: Vec<f64>,
    pub net_present_value: f64,
    pub payback_period: Payback,
}

impl ImpactMetrics {
    /// Compare an intervention projection with its baseline
    pub fn evaluate(baseline: &Projection, scenario: &Projection, config: &ScenarioConfig) -> Self {
        let total_reduction = baseline.summary.total_cumulative - scenario.summary.total_cumulative;
        let annual_reductions: Vec<f64> = baseline
            .emissions
            .iter()
            .zip(&scenario.emissions)
            .map(|(b, s)| b - s)
            .collect();
        let peak = argmax(&annual_reductions).unwrap_or(0);
        let total_cost = scenario.summary.total_intervention_cost;

        let effect_reductions = scenario.annual_reductions();
        let effect_costs = scenario.annual_costs();

        Self {
            total_emission_reduction: total_reduction,
            reduction_percentage: safe_ratio(total_reduction, baseline.summary.total_cumulative) * 100.0,
            average_annual_reduction: mean(&annual_reductions),
            peak_reduction: annual_reductions.get(peak).copied().unwrap_or(0.0),
            peak_reduction_year: baseline.years.get(peak).copied().unwrap_or_default(),
            total_intervention_cost: total_cost,
            cost_per_tonne_co2: if total_reduction > 0.0 {
                safe_ratio(total_cost, total_reduction)
            } else {
                0.0
            },
            net_present_value: net_present_value(
                &effect_reductions,
                &effect_costs,
                config.carbon_price,
                config.discount_rate,
            ),
            payback_period: payback_period(&effect_reductions, &effect_costs, config.carbon_price),
            annual_reductions,
        }
    }
}

/// `Σ (reduction_y × carbon_price − cost_y) / (1 + r)^y`
pub fn net_present_value(reductions: &[f64], costs: &[f64], carbon_price: f64, discount_rate: f64) -> f64 {
    reductions
        .iter()
        .zip(costs)
        .enumerate()
        .map(|(year, (reduction, cost))| {
            let cash_flow = reduction * carbon_price - cost;
            cash_flow / (1.0 + discount_rate).powi(year as i32)
        })
        .sum()
}

/// First year whose cumulative savings reach the cumulative cost
///
/// Years before the first booked cost do not count; a scenario without cost pays back
/// in year 0.
pub fn payback_period(reductions: &[f64], costs: &[f64], carbon_price: f64) -> Payback {
    if costs.iter().all(|c| *c <= 0.0) {
        return Payback::Year(0);
    }
    let mut savings = 0.0;
    let mut spent = 0.0;
    for (year, (reduction, cost)) in (0u32..).zip(reductions.iter().zip(costs)) {
        savings += reduction * carbon_price;
        spent += cost;
        if spent > 0.0 && savings >= spent {
            return Payback::Year(year);
        }
    }
    Payback::Never
}
