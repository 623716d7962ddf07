//! Year-by-year emission trajectories
//!
//! A projection spans `timeline_years + 1` points, year 0 being the epoch year. The
//! baseline compounds the net growth rate; intervention projections subtract each
//! intervention's realized reduction from the baseline and then rebuild every derived
//! series from the adjusted emissions.

use crate::error::{Result, ScenarioError};
use crate::intervention::Intervention;
use crate::profile::EmissionsProfile;
use emission_core::stats::{argmax, mean, safe_ratio};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Aggregates of a projected trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_cumulative: f64,
    pub final_year_emissions: f64,
    pub average_annual_emissions: f64,
    /// Change from year 0 to the final year, in percent
    pub emission_change_pct: f64,
    /// Calendar year of the highest emissions
    pub peak_year: i32,
    pub peak_emissions: f64,
    pub total_intervention_cost: f64,
    pub total_reduction_achieved: f64,
}

/// Contribution of one intervention, per projection year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionEffect {
    pub name: String,
    pub annual_impact: Vec<f64>,
    pub cumulative_impact: Vec<f64>,
    pub costs: Vec<f64>,
}

impl InterventionEffect {
    fn new(name: &str, points: usize) -> Self {
        Self {
            name: name.to_string(),
            annual_impact: vec![0.0; points],
            cumulative_impact: vec![0.0; points],
            costs: vec![0.0; points],
        }
    }

    pub fn total_impact(&self) -> f64 {
        self.cumulative_impact.last().copied().unwrap_or(0.0)
    }

    pub fn total_cost(&self) -> f64 {
        self.costs.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub years: Vec<i32>,
    pub emissions: Vec<f64>,
    pub cumulative_emissions: Vec<f64>,
    pub emission_intensity: Vec<f64>,
    pub summary: ProjectionSummary,
    #[serde(default)]
    pub intervention_effects: Vec<InterventionEffect>,
}

impl Projection {
    /// Business-as-usual trajectory `E_y = E_0 (1 + g - e)^y`
    pub fn baseline(profile: &EmissionsProfile) -> Self {
        let epoch = profile.resolved_epoch_year();
        let net_factor = 1.0 + profile.net_growth_rate();
        let emissions: Vec<f64> = (0..=profile.timeline_years)
            .map(|year| profile.current_emissions * net_factor.powi(year as i32))
            .collect();
        Self::derive(epoch, profile, emissions, Vec::new())
    }

    /// Overlay interventions on a baseline projection
    ///
    /// With `rng` set, every active year multiplies the effectiveness by a draw from
    /// `N(1, uncertainty)`; the product is clamped to `[0, 1]` either way.
    pub fn with_interventions(
        baseline: &Projection,
        profile: &EmissionsProfile,
        interventions: &[Intervention],
        mut rng: Option<&mut StdRng>,
    ) -> Result<Self> {
        let points = baseline.emissions.len();
        let mut emissions = baseline.emissions.clone();
        let mut effects = Vec::with_capacity(interventions.len());

        for intervention in interventions {
            let noise = Normal::new(1.0, intervention.uncertainty)
                .map_err(|e| ScenarioError::Sampling(format!("{}: {}", intervention.name, e)))?;
            let mut effect = InterventionEffect::new(&intervention.name, points);
            let mut running = 0.0;

            for (index, year) in (0..points).zip(0u32..) {
                if year >= intervention.start_offset {
                    let mut effectiveness = intervention.effectiveness(year);
                    if let Some(rng) = rng.as_deref_mut() {
                        effectiveness *= noise.sample(rng);
                    }
                    let effectiveness = effectiveness.clamp(0.0, 1.0);

                    let mut reduction =
                        baseline.emissions[index] * intervention.annual_reduction * effectiveness;
                    if intervention.is_first_active_year(year) {
                        reduction += intervention.one_time_reduction;
                        effect.costs[index] = intervention.cost;
                    }
                    effect.annual_impact[index] = reduction;
                    emissions[index] -= reduction;
                }
                running += effect.annual_impact[index];
                effect.cumulative_impact[index] = running;
            }
            effects.push(effect);
        }

        let epoch = baseline.years.first().copied().unwrap_or_else(|| profile.resolved_epoch_year());
        Ok(Self::derive(epoch, profile, emissions, effects))
    }

    /// Rebuild cumulative, intensity and summary series from annual emissions
    fn derive(
        epoch: i32,
        profile: &EmissionsProfile,
        emissions: Vec<f64>,
        intervention_effects: Vec<InterventionEffect>,
    ) -> Self {
        let years: Vec<i32> = (0..emissions.len() as i32).map(|y| epoch + y).collect();
        let business_factor = 1.0 + profile.business_growth_rate;

        let mut total = 0.0;
        let cumulative_emissions: Vec<f64> = emissions
            .iter()
            .map(|e| {
                total += e;
                total
            })
            .collect();
        let emission_intensity: Vec<f64> = emissions
            .iter()
            .enumerate()
            .map(|(y, e)| safe_ratio(*e, business_factor.powi(y as i32)))
            .collect();

        let first = emissions.first().copied().unwrap_or(0.0);
        let last = emissions.last().copied().unwrap_or(0.0);
        let peak = argmax(&emissions).unwrap_or(0);
        let summary = ProjectionSummary {
            total_cumulative: total,
            final_year_emissions: last,
            average_annual_emissions: mean(&emissions),
            emission_change_pct: safe_ratio(last - first, first) * 100.0,
            peak_year: years.get(peak).copied().unwrap_or(epoch),
            peak_emissions: emissions.get(peak).copied().unwrap_or(0.0),
            total_intervention_cost: intervention_effects
                .iter()
                .fold(0.0, |acc, e| acc + e.total_cost()),
            total_reduction_achieved: intervention_effects
                .iter()
                .fold(0.0, |acc, e| acc + e.total_impact()),
        };

        Self {
            years,
            emissions,
            cumulative_emissions,
            emission_intensity,
            summary,
            intervention_effects,
        }
    }

    /// Number of projected years including year 0
    pub fn len(&self) -> usize {
        self.emissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }

    /// Summed reduction of all interventions, per year
    pub fn annual_reductions(&self) -> Vec<f64> {
        self.sum_effects(|effect| &effect.annual_impact)
    }

    /// Summed intervention cost, per year
    pub fn annual_costs(&self) -> Vec<f64> {
        self.sum_effects(|effect| &effect.costs)
    }

    fn sum_effects<F>(&self, series: F) -> Vec<f64>
    where
        F: Fn(&InterventionEffect) -> &Vec<f64>,
    {
        let mut totals = vec![0.0; self.len()];
        for effect in &self.intervention_effects {
            for (total, value) in totals.iter_mut().zip(series(effect)) {
                *total += value;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn profile() -> EmissionsProfile {
        EmissionsProfile::new(10_000.0).with_epoch_year(2025)
    }

    #[test]
    fn test_baseline_growth() {
        let projection = Projection::baseline(&profile());
        assert_eq!(projection.len(), 11);
        assert_eq!(projection.years[0], 2025);
        assert_eq!(projection.years[10], 2035);
        assert_abs_diff_eq!(projection.emissions[1], 10_400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(projection.emission_intensity[0], 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            projection.emission_intensity[1],
            10_400.0 / 1.05,
            epsilon = 1e-9
        );
        assert_eq!(projection.summary.peak_year, 2035);
    }

    #[test]
    fn test_baseline_totals_are_positive_zero() {
        let summary = Projection::baseline(&profile()).summary;
        assert!(summary.total_intervention_cost.is_sign_positive());
        assert!(summary.total_reduction_achieved.is_sign_positive());
    }

    #[test]
    fn test_one_time_reduction_and_cost_in_first_year() {
        let baseline = Projection::baseline(&profile());
        let interventions = vec![Intervention::new("Refrigerant swap", 0.0, 5_000.0)
            .starting_at(2)
            .with_one_time_reduction(300.0)];
        let projection =
            Projection::with_interventions(&baseline, &profile(), &interventions, None).unwrap();

        let effect = &projection.intervention_effects[0];
        assert_eq!(effect.annual_impact[2], 300.0);
        assert_eq!(effect.annual_impact[3], 0.0);
        assert_eq!(effect.costs[2], 5_000.0);
        assert_eq!(effect.total_cost(), 5_000.0);
        assert_abs_diff_eq!(
            projection.emissions[2],
            baseline.emissions[2] - 300.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            projection.summary.total_cumulative,
            baseline.summary.total_cumulative - 300.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_seeded_perturbation_is_repeatable() {
        let baseline = Projection::baseline(&profile());
        let interventions = vec![Intervention::new("Boiler upgrade", 0.2, 10_000.0).with_uncertainty(0.3)];

        let mut first_rng = StdRng::seed_from_u64(7);
        let mut second_rng = StdRng::seed_from_u64(7);
        let first =
            Projection::with_interventions(&baseline, &profile(), &interventions, Some(&mut first_rng))
                .unwrap();
        let second =
            Projection::with_interventions(&baseline, &profile(), &interventions, Some(&mut second_rng))
                .unwrap();
        assert_eq!(first, second);

        for (index, impact) in first.intervention_effects[0].annual_impact.iter().enumerate() {
            assert!(*impact >= 0.0);
            assert!(*impact <= baseline.emissions[index] * 0.2 + 1e-9);
        }
    }
}
