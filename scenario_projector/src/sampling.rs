//! Monte-Carlo sampling of intervention uncertainty

use crate::error::{Result, ScenarioError};
use crate::intervention::Intervention;
use crate::profile::EmissionsProfile;
use crate::projection::Projection;
use emission_core::stats::{mean, percentile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Distribution of outcomes over repeated perturbed projections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub scenario: String,
    pub runs: usize,
    pub seed: u64,
    pub mean_total_reduction: f64,
    pub p5_total_reduction: f64,
    pub p50_total_reduction: f64,
    pub p95_total_reduction: f64,
    /// Mean emissions per projection year
    pub mean_emissions: Vec<f64>,
}

/// Project `runs` perturbed copies of a scenario from a single seeded generator
pub fn sample(
    name: &str,
    baseline: &Projection,
    profile: &EmissionsProfile,
    interventions: &[Intervention],
    runs: usize,
    seed: u64,
) -> Result<MonteCarloSummary> {
    if runs == 0 {
        return Err(ScenarioError::InvalidParameter(
            "runs must be at least 1".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut reductions = Vec::with_capacity(runs);
    let mut emission_sums = vec![0.0; baseline.len()];
    for _ in 0..runs {
        let projection =
            Projection::with_interventions(baseline, profile, interventions, Some(&mut rng))?;
        reductions.push(baseline.summary.total_cumulative - projection.summary.total_cumulative);
        for (sum, value) in emission_sums.iter_mut().zip(&projection.emissions) {
            *sum += value;
        }
    }

    Ok(MonteCarloSummary {
        scenario: name.to_string(),
        runs,
        seed,
        mean_total_reduction: mean(&reductions),
        p5_total_reduction: percentile(&reductions, 5.0),
        p50_total_reduction: percentile(&reductions, 50.0),
        p95_total_reduction: percentile(&reductions, 95.0),
        mean_emissions: emission_sums.iter().map(|s| s / runs as f64).collect(),
    })
}
