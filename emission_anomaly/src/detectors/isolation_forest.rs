//! Isolation forest density detector
//!
//! Records that are isolated by few random axis-aligned splits are anomalous. Trees are
//! stored as flat node arenas and built from an explicitly seeded generator, so the same
//! configuration and training table always yield the same forest.

use super::{AnomalyDetector, DetectionResult};
use crate::config::EnsembleConfig;
use crate::features::FeatureTable;
use crate::{AnomalyError, Result};
use emission_core::regression::StandardScaler;
use emission_core::stats;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::debug;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        value: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build(rows: &[Vec<f64>], sample: Vec<usize>, height_limit: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(rows, sample, 0, height_limit, rng);
        tree
    }

    /// Append the subtree for `indices` and return its root position
    fn grow(
        &mut self,
        rows: &[Vec<f64>],
        indices: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> usize {
        let position = self.nodes.len();
        if depth >= height_limit || indices.len() <= 1 {
            self.nodes.push(Node::Leaf {
                size: indices.len(),
            });
            return position;
        }

        // Only features that still vary can split the node
        let width = rows[indices[0]].len();
        let candidates: Vec<(usize, f64, f64)> = (0..width)
            .filter_map(|feature| {
                let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                    (lo.min(rows[i][feature]), hi.max(rows[i][feature]))
                });
                (hi > lo).then_some((feature, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            self.nodes.push(Node::Leaf {
                size: indices.len(),
            });
            return position;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let value = rng.gen_range(lo..hi);
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
            indices.into_iter().partition(|&i| rows[i][feature] < value);

        // Placeholder until both children exist
        self.nodes.push(Node::Leaf { size: 0 });
        let left = self.grow(rows, left_indices, depth + 1, height_limit, rng);
        let right = self.grow(rows, right_indices, depth + 1, height_limit, rng);
        self.nodes[position] = Node::Split {
            feature,
            value,
            left,
            right,
        };
        position
    }

    fn path_length(&self, row: &[f64]) -> f64 {
        let mut position = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[position] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    value,
                    left,
                    right,
                } => {
                    position = if row[*feature] < *value { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful binary-search-tree lookup among `n` records
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
struct FittedForest {
    scaler: StandardScaler,
    trees: Vec<IsolationTree>,
    normalizer: f64,
    threshold: f64,
}

impl FittedForest {
    fn score(&self, row: &[f64]) -> f64 {
        let scaled = self.scaler.transform_row(row);
        let mean_path = self
            .trees
            .iter()
            .map(|tree| tree.path_length(&scaled))
            .sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-mean_path / self.normalizer)
    }
}

/// Isolation forest over standardized features
#[derive(Debug, Clone)]
pub struct DensityDetector {
    n_trees: usize,
    sample_size: usize,
    contamination: f64,
    seed: u64,
    forest: Option<FittedForest>,
}

impl DensityDetector {
    /// Create a new isolation forest detector
    pub fn new(n_trees: usize, sample_size: usize, contamination: f64, seed: u64) -> Result<Self> {
        if n_trees == 0 {
            return Err(AnomalyError::InvalidParameter(
                "n_trees must be greater than zero".to_string(),
            ));
        }
        if sample_size < 2 {
            return Err(AnomalyError::InvalidParameter(
                "sample_size must be at least 2".to_string(),
            ));
        }
        if !(contamination > 0.0 && contamination < 0.5) {
            return Err(AnomalyError::InvalidParameter(format!(
                "contamination must be in (0, 0.5), got {}",
                contamination
            )));
        }

        Ok(Self {
            n_trees,
            sample_size,
            contamination,
            seed,
            forest: None,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &EnsembleConfig) -> Result<Self> {
        Self::new(
            config.n_trees,
            config.sample_size,
            config.contamination,
            config.seed,
        )
    }

    /// Score threshold fixed at training time
    pub fn threshold(&self) -> Option<f64> {
        self.forest.as_ref().map(|f| f.threshold)
    }
}

impl AnomalyDetector for DensityDetector {
    fn name(&self) -> &str {
        "isolation_forest"
    }

    fn fit(&mut self, table: &FeatureTable) -> Result<()> {
        if table.len() < 2 {
            return Err(AnomalyError::InsufficientData(format!(
                "isolation forest needs at least 2 records, got {}",
                table.len()
            )));
        }

        let scaler = StandardScaler::fit(table.rows())?;
        let scaled = scaler.transform(table.rows());
        let sample = self.sample_size.min(scaled.len());
        let height_limit = (sample as f64).log2().ceil() as usize;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let trees = (0..self.n_trees)
            .map(|_| {
                let picked = index::sample(&mut rng, scaled.len(), sample).into_vec();
                IsolationTree::build(&scaled, picked, height_limit, &mut rng)
            })
            .collect();

        let mut forest = FittedForest {
            scaler,
            trees,
            normalizer: average_path_length(sample),
            threshold: 0.0,
        };
        let training_scores: Vec<f64> = table.rows().iter().map(|r| forest.score(r)).collect();
        forest.threshold = stats::percentile(&training_scores, 100.0 * (1.0 - self.contamination));

        debug!(
            trees = self.n_trees,
            sample,
            threshold = forest.threshold,
            "Isolation forest fitted"
        );
        self.forest = Some(forest);
        Ok(())
    }

    fn detect(&self, table: &FeatureTable) -> Result<DetectionResult> {
        let forest = self
            .forest
            .as_ref()
            .ok_or_else(|| AnomalyError::NotFitted(self.name().to_string()))?;

        let scores: Vec<f64> = table.rows().iter().map(|r| forest.score(r)).collect();
        let is_anomaly = scores.iter().map(|&s| s > forest.threshold).collect();
        Ok(DetectionResult::new(is_anomaly, scores, forest.threshold))
    }

    fn is_fitted(&self) -> bool {
        self.forest.is_some()
    }
}
