//! Side-by-side scenario comparison

use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the baseline row in a comparison
pub const BASELINE_KEY: &str = "baseline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub total_emissions: f64,
    pub final_year_emissions: f64,
    pub total_cost: f64,
    pub emission_reduction: f64,
    pub cost_per_tonne: f64,
    pub npv: f64,
}

impl ScenarioMetrics {
    fn baseline(scenario: &Scenario) -> Self {
        Self {
            total_emissions: scenario.projections.summary.total_cumulative,
            final_year_emissions: scenario.projections.summary.final_year_emissions,
            total_cost: 0.0,
            emission_reduction: 0.0,
            cost_per_tonne: 0.0,
            npv: 0.0,
        }
    }

    fn from_scenario(scenario: &Scenario) -> Self {
        let summary = &scenario.projections.summary;
        let impact = scenario.impact_metrics.as_ref();
        Self {
            total_emissions: summary.total_cumulative,
            final_year_emissions: summary.final_year_emissions,
            total_cost: summary.total_intervention_cost,
            emission_reduction: impact.map_or(0.0, |m| m.total_emission_reduction),
            cost_per_tonne: impact.map_or(0.0, |m| m.cost_per_tonne_co2),
            npv: impact.map_or(0.0, |m| m.net_present_value),
        }
    }
}

/// Leading scenario per axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestScenarios {
    pub highest_reduction: String,
    /// Lowest positive cost per tonne, if any scenario has one
    pub most_cost_effective: Option<String>,
    pub highest_npv: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    /// Baseline first, then the requested scenarios in request order
    pub scenarios_compared: Vec<String>,
    pub comparison_metrics: BTreeMap<String, ScenarioMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_scenario: Option<BestScenarios>,
    pub trade_offs: Vec<String>,
}

impl ScenarioComparison {
    pub(crate) fn build(baseline: &Scenario, scenarios: &[&Scenario]) -> Self {
        let rows: Vec<(String, ScenarioMetrics)> = scenarios
            .iter()
            .map(|s| (s.name.clone(), ScenarioMetrics::from_scenario(s)))
            .collect();

        let mut scenarios_compared = vec![BASELINE_KEY.to_string()];
        scenarios_compared.extend(rows.iter().map(|(name, _)| name.clone()));

        let mut comparison_metrics = BTreeMap::new();
        comparison_metrics.insert(BASELINE_KEY.to_string(), ScenarioMetrics::baseline(baseline));
        comparison_metrics.extend(rows.iter().cloned());

        Self {
            scenarios_compared,
            comparison_metrics,
            best_scenario: best_scenarios(&rows),
            trade_offs: trade_offs(&rows),
        }
    }
}

/// First row holding the maximum of `key`
fn leader<'a, I, F>(rows: I, key: F) -> Option<&'a (String, ScenarioMetrics)>
where
    I: IntoIterator<Item = &'a (String, ScenarioMetrics)>,
    F: Fn(&ScenarioMetrics) -> f64,
{
    rows.into_iter().fold(None, |best, row| match best {
        Some(top) if key(&top.1) >= key(&row.1) => Some(top),
        _ => Some(row),
    })
}

/// Lowest positive cost per tonne
fn cheapest_per_tonne(rows: &[(String, ScenarioMetrics)]) -> Option<&(String, ScenarioMetrics)> {
    leader(rows.iter().filter(|(_, m)| m.cost_per_tonne > 0.0), |m| -m.cost_per_tonne)
}

fn best_scenarios(rows: &[(String, ScenarioMetrics)]) -> Option<BestScenarios> {
    let highest_reduction = leader(rows, |m| m.emission_reduction)?;
    let highest_npv = leader(rows, |m| m.npv)?;
    Some(BestScenarios {
        highest_reduction: highest_reduction.0.clone(),
        most_cost_effective: cheapest_per_tonne(rows).map(|(name, _)| name.clone()),
        highest_npv: highest_npv.0.clone(),
    })
}

fn trade_offs(rows: &[(String, ScenarioMetrics)]) -> Vec<String> {
    let mut statements = Vec::new();
    if rows.len() < 2 {
        return statements;
    }

    let most_reduction = leader(rows, |m| m.emission_reduction);
    let lowest_cost = leader(rows, |m| -m.total_cost);
    if let (Some((top, _)), Some((cheap, _))) = (most_reduction, lowest_cost) {
        if top != cheap {
            statements.push(format!(
                "{} achieves highest reduction but at higher cost than {}",
                top, cheap
            ));
        }
    }

    if let Some((name, metrics)) = cheapest_per_tonne(rows) {
        statements.push(format!(
            "{} offers best cost per tonne CO2 at ${:.2}",
            name, metrics.cost_per_tonne
        ));
    }

    if let Some((name, metrics)) = leader(rows.iter().filter(|(_, m)| m.npv > 0.0), |m| m.npv) {
        statements.push(format!(
            "{} offers best financial return with NPV of {}",
            name,
            format_currency(metrics.npv)
        ));
    }
    statements
}

/// `$1,234,567.89`
pub fn format_currency(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "$0.00")]
    #[case(999.5, "$999.50")]
    #[case(1_234.5, "$1,234.50")]
    #[case(1_234_567.891, "$1,234,567.89")]
    #[case(-45_000.0, "-$45,000.00")]
    fn test_format_currency(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_currency(value), expected);
    }
}
