//! Seeded differential evolution over `[0, 1]^n`
//!
//! Candidate vectors are decoded to a selection by thresholding each coordinate at
//! 0.5. The search runs a fixed number of generations with the `best/1/bin` scheme, so
//! its cost is bounded and a given seed always produces the same answer.

use super::OptimizationStrategy;
use crate::config::OptimizerConfig;
use crate::problem::ReductionProblem;
use crate::result::OptimizationResult;
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Smallest population that can draw two donors distinct from the target
const MIN_POPULATION: usize = 5;

/// Best vector found by a search
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOutcome {
    pub best: Vec<f64>,
    pub value: f64,
    pub evaluations: usize,
}

/// Differential evolution minimiser
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialEvolution {
    population_factor: usize,
    generations: usize,
    mutation: (f64, f64),
    recombination: f64,
    seed: u64,
}

impl DifferentialEvolution {
    /// Create a new minimiser
    pub fn new(
        population_factor: usize,
        generations: usize,
        mutation: (f64, f64),
        recombination: f64,
        seed: u64,
    ) -> Self {
        Self {
            population_factor,
            generations,
            mutation,
            recombination,
            seed,
        }
    }

    /// Minimise `objective` over the unit hypercube of `dimensions` coordinates
    pub fn minimize<F>(&self, dimensions: usize, objective: F) -> EvolutionOutcome
    where
        F: Fn(&[f64]) -> f64,
    {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let size = (self.population_factor * dimensions).max(MIN_POPULATION);

        let mut population: Vec<Vec<f64>> = (0..size)
            .map(|_| (0..dimensions).map(|_| rng.gen::<f64>()).collect())
            .collect();
        let mut energies: Vec<f64> = population.iter().map(|x| objective(x)).collect();
        let mut evaluations = size;
        let mut best = best_index(&energies);

        if dimensions == 0 {
            return EvolutionOutcome {
                best: Vec::new(),
                value: energies[best],
                evaluations,
            };
        }

        let (low, high) = self.mutation;
        for _ in 0..self.generations {
            // Dithered differential weight, one draw per generation
            let weight = rng.gen_range(low..=high);
            for target in 0..size {
                let donors: Vec<usize> = index::sample(&mut rng, size, 3)
                    .into_iter()
                    .filter(|&i| i != target)
                    .take(2)
                    .collect();
                let (a, b) = (&population[donors[0]], &population[donors[1]]);

                let forced = rng.gen_range(0..dimensions);
                let trial: Vec<f64> = (0..dimensions)
                    .map(|k| {
                        if k == forced || rng.gen::<f64>() < self.recombination {
                            (population[best][k] + weight * (a[k] - b[k])).clamp(0.0, 1.0)
                        } else {
                            population[target][k]
                        }
                    })
                    .collect();

                let energy = objective(&trial);
                evaluations += 1;
                if energy <= energies[target] {
                    population[target] = trial;
                    energies[target] = energy;
                    if energy < energies[best] {
                        best = target;
                    }
                }
            }
        }

        EvolutionOutcome {
            best: population[best].clone(),
            value: energies[best],
            evaluations,
        }
    }
}

fn best_index(energies: &[f64]) -> usize {
    energies
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i)
}

/// Catalog indices whose coordinate exceeds 0.5
pub fn decode(vector: &[f64]) -> Vec<usize> {
    vector
        .iter()
        .enumerate()
        .filter_map(|(i, &x)| if x > 0.5 { Some(i) } else { None })
        .collect()
}

/// Binary selection maximising total reduction with a linear budget-overage penalty
#[derive(Debug, Clone)]
pub struct GeneticAlgorithmStrategy {
    search: DifferentialEvolution,
    penalty_multiplier: f64,
}

impl GeneticAlgorithmStrategy {
    /// Create a new strategy with an explicit search and penalty
    pub fn new(search: DifferentialEvolution, penalty_multiplier: f64) -> Self {
        Self {
            search,
            penalty_multiplier,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(
            DifferentialEvolution::new(
                config.population_factor,
                config.generations,
                config.mutation,
                config.recombination,
                config.seed,
            ),
            config.penalty_multiplier,
        )
    }

    fn objective(&self, problem: &ReductionProblem, picks: &[usize]) -> f64 {
        let totals = problem.totals(picks, 0.0);
        let overage = (totals.cost - problem.budget()).max(0.0);
        -totals.reduction + self.penalty_multiplier * overage
    }
}

impl Default for GeneticAlgorithmStrategy {
    fn default() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }
}

impl OptimizationStrategy for GeneticAlgorithmStrategy {
    fn name(&self) -> &str {
        "genetic_algorithm"
    }

    fn optimize(&self, problem: &ReductionProblem) -> Result<OptimizationResult> {
        let outcome = self
            .search
            .minimize(problem.len(), |x| self.objective(problem, &decode(x)));
        if !outcome.value.is_finite() {
            return Ok(OptimizationResult::failure(
                self.name(),
                "search produced a non-finite objective",
            ));
        }

        let mut picks = decode(&outcome.best);
        problem.repair(&mut picks);
        debug!(
            evaluations = outcome.evaluations,
            objective = outcome.value,
            selected = picks.len(),
            "Evolutionary search finished"
        );

        let objective = self.objective(problem, &picks);
        Ok(OptimizationResult::from_picks(self.name(), problem, &picks).with_objective(-objective))
    }

    fn describe(&self) -> String {
        format!(
            "population_factor={} generations={} seed={} penalty_multiplier={}",
            self.search.population_factor,
            self.search.generations,
            self.search.seed,
            self.penalty_multiplier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_minimize_sphere() {
        let search = DifferentialEvolution::new(15, 200, (0.5, 1.0), 0.7, 3);
        let outcome = search.minimize(3, |x| x.iter().map(|v| (v - 0.25).powi(2)).sum());
        for coordinate in &outcome.best {
            assert_abs_diff_eq!(*coordinate, 0.25, epsilon = 1e-3);
        }
        assert_eq!(outcome.evaluations, 45 + 45 * 200);
    }

    #[test]
    fn test_decode_threshold() {
        assert_eq!(decode(&[0.2, 0.5, 0.51, 0.9]), vec![2, 3]);
    }
}
