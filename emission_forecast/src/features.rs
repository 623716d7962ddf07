//! Derived regression features for daily emission totals
//!
//! Features only look at values strictly before the target day, so the same
//! function serves fitting and recursive multi-step forecasting.

use chrono::{DateTime, Utc};
use emission_core::rolling::trailing_past;
use emission_core::CalendarFeatures;

/// Longest lag used by any feature
pub const MAX_LAG: usize = 30;

/// Column names, in the order produced by [`feature_vector`]
pub const FEATURE_NAMES: [&str; 10] = [
    "lag_1",
    "lag_7",
    "lag_30",
    "rolling_mean_7",
    "rolling_std_7",
    "rolling_mean_30",
    "rolling_std_30",
    "day_of_week",
    "month",
    "quarter",
];

/// Features for the day at `timestamp`, given every value observed before it
///
/// Returns `None` until [`MAX_LAG`] values of history are available.
pub fn feature_vector(history: &[f64], timestamp: &DateTime<Utc>) -> Option<Vec<f64>> {
    let n = history.len();
    if n < MAX_LAG {
        return None;
    }

    let (mean_7, std_7) = trailing_past(history, n, 7)?;
    let (mean_30, std_30) = trailing_past(history, n, 30)?;
    let calendar = CalendarFeatures::from_timestamp(timestamp);

    Some(vec![
        history[n - 1],
        history[n - 7],
        history[n - 30],
        mean_7,
        std_7,
        mean_30,
        std_30,
        calendar.day_of_week as f64,
        calendar.month as f64,
        calendar.quarter as f64,
    ])
}

/// Feature rows and targets for every day with a full history window
pub fn feature_table(values: &[f64], timestamps: &[DateTime<Utc>]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut rows = Vec::new();
    let mut targets = Vec::new();

    for i in MAX_LAG..values.len().min(timestamps.len()) {
        if let Some(row) = feature_vector(&values[..i], &timestamps[i]) {
            rows.push(row);
            targets.push(values[i]);
        }
    }

    (rows, targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_feature_vector_needs_full_history() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert!(feature_vector(&[1.0; 29], &ts).is_none());

        let history: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let row = feature_vector(&history, &ts).unwrap();
        assert_eq!(row.len(), FEATURE_NAMES.len());
        assert_eq!(row[0], 29.0);
        assert_eq!(row[1], 23.0);
        assert_eq!(row[2], 0.0);
        assert_eq!(row[3], 26.0);
        assert_eq!(row[8], 5.0);
        assert_eq!(row[9], 2.0);
    }

    #[test]
    fn test_feature_table_length() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let values: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let timestamps: Vec<_> = (0..50).map(|i| start + Duration::days(i)).collect();
        let (rows, targets) = feature_table(&values, &timestamps);
        assert_eq!(rows.len(), 20);
        assert_eq!(targets[0], 30.0);
    }
}
