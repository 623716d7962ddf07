//! Utility functions for the emission_forecast crate

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Chronological split point for a series of `len` points
///
/// Returns the number of training points. The test part is at least one point and the
/// training part keeps the rest; the data is never shuffled.
pub fn train_test_split_index(len: usize, test_ratio: f64) -> usize {
    if len < 2 || test_ratio <= 0.0 || test_ratio >= 1.0 {
        return len;
    }
    let test_size = ((len as f64 * test_ratio).round() as usize).clamp(1, len - 1);
    len - test_size
}

/// Calendar days following `last_timestamp`
pub fn future_dates(last_timestamp: DateTime<Utc>, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon)
        .map(|step| (last_timestamp + Duration::days(step as i64)).date_naive())
        .collect()
}
