//! Utility functions for the reduction optimizer

pub use emission_core::stats::safe_ratio;

/// Indices ordered by descending key, ties kept in input order
pub fn rank_descending(keys: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[b].total_cmp(&keys[a]));
    order
}
