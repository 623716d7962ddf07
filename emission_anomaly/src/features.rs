//! Feature preparation for anomaly detection
//!
//! Every series maps to the same fixed column schema, so detectors fitted on one
//! table can score any other. Rolling statistics use trailing windows that include
//! the current record; positions before a window fills take the column mean.
//!
//! Batches scored after training go through [`prepare_features_with_context`]: a batch
//! that continues the training series completes its windows with the last training
//! values, and whatever stays incomplete takes the training column mean.

use crate::{AnomalyError, Result};
use chrono::{DateTime, Utc};
use emission_core::rolling::{rolling_mean, rolling_std};
use emission_core::{stats, CalendarFeatures, ObservationSeries, Scope};
use serde::{Deserialize, Serialize};

/// Column names of every feature table, in order
pub const FEATURE_COLUMNS: [&str; 13] = [
    "emissions",
    "emissions_log",
    "day_of_week",
    "month",
    "quarter",
    "hour",
    "rolling_mean_7",
    "rolling_std_7",
    "deviation_from_mean_7",
    "rolling_mean_30",
    "rolling_std_30",
    "deviation_from_mean_30",
    "scope_numeric",
];

/// Columns holding measurements rather than calendar positions or category codes
pub const MEASUREMENT_COLUMNS: [&str; 8] = [
    "emissions",
    "emissions_log",
    "rolling_mean_7",
    "rolling_std_7",
    "deviation_from_mean_7",
    "rolling_mean_30",
    "rolling_std_30",
    "deviation_from_mean_30",
];

const ROLLING_WINDOWS: [usize; 2] = [7, 30];

/// Training values kept to complete the windows of a following batch
const HISTORY_LEN: usize = 29;

/// Per-record features plus the identifying fields of each record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    rows: Vec<Vec<f64>>,
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    scopes: Vec<Option<Scope>>,
    activity_types: Vec<Option<String>>,
    company_ids: Vec<Option<u64>>,
}

/// Training-side state for deriving features of later batches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContext {
    tail: Vec<f64>,
    last_timestamp: DateTime<Utc>,
    column_means: Vec<f64>,
}

impl FeatureContext {
    /// Capture the trailing values and column means of a training table
    pub fn from_table(table: &FeatureTable) -> Result<Self> {
        let last_timestamp = table.timestamps.last().copied().ok_or_else(|| {
            AnomalyError::InsufficientData("cannot capture context of an empty table".to_string())
        })?;
        let skip = table.values.len().saturating_sub(HISTORY_LEN);
        let column_means = (0..table.width())
            .map(|i| {
                let column: Vec<f64> = table.rows.iter().map(|row| row[i]).collect();
                stats::mean(&column)
            })
            .collect();

        Ok(Self {
            tail: table.values[skip..].to_vec(),
            last_timestamp,
            column_means,
        })
    }

    /// Whether `series` starts after the training data
    pub fn continues(&self, series: &ObservationSeries) -> bool {
        series
            .first_timestamp()
            .map_or(false, |first| first > self.last_timestamp)
    }

    /// Training mean of each feature column
    pub fn column_means(&self) -> &[f64] {
        &self.column_means
    }
}

/// Derive the fixed feature schema from a series
pub fn prepare_features(series: &ObservationSeries) -> Result<FeatureTable> {
    derive(series, &[], None)
}

/// Derive features for a batch scored against fitted detectors
pub fn prepare_features_with_context(
    series: &ObservationSeries,
    context: &FeatureContext,
) -> Result<FeatureTable> {
    let history = if context.continues(series) {
        context.tail.as_slice()
    } else {
        &[]
    };
    derive(series, history, Some(&context.column_means))
}

fn derive(
    series: &ObservationSeries,
    history: &[f64],
    fill_means: Option<&[f64]>,
) -> Result<FeatureTable> {
    let observations = series.observations();
    if observations.is_empty() {
        return Err(AnomalyError::InsufficientData(
            "cannot derive features from an empty series".to_string(),
        ));
    }

    let values = series.values();
    let n = values.len();

    // Column-major while deriving, filled per column
    let mut columns: Vec<Vec<Option<f64>>> = Vec::with_capacity(FEATURE_COLUMNS.len());
    columns.push(values.iter().map(|&v| Some(v)).collect());
    columns.push(values.iter().map(|&v| Some(v.max(0.0).ln_1p())).collect());

    let calendar: Vec<CalendarFeatures> = observations
        .iter()
        .map(|o| CalendarFeatures::from_timestamp(&o.timestamp))
        .collect();
    columns.push(calendar.iter().map(|c| Some(c.day_of_week as f64)).collect());
    columns.push(calendar.iter().map(|c| Some(c.month as f64)).collect());
    columns.push(calendar.iter().map(|c| Some(c.quarter as f64)).collect());
    columns.push(calendar.iter().map(|c| Some(c.hour as f64)).collect());

    let extended: Vec<f64> = history.iter().chain(&values).copied().collect();
    for window in ROLLING_WINDOWS {
        let means: Vec<Option<f64>> = rolling_mean(&extended, window)
            .into_iter()
            .skip(history.len())
            .collect();
        let stds = rolling_std(&extended, window)
            .into_iter()
            .skip(history.len())
            .collect();
        let deviations = values
            .iter()
            .zip(&means)
            .map(|(v, m)| m.map(|m| v - m))
            .collect();
        columns.push(means);
        columns.push(stds);
        columns.push(deviations);
    }

    columns.push(
        observations
            .iter()
            .map(|o| Some(o.scope.map_or(0.0, |s| s.code() as f64)))
            .collect(),
    );

    let filled: Vec<Vec<f64>> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let fallback = match fill_means {
                Some(means) => means.get(i).copied().unwrap_or_default(),
                None => present_mean(column),
            };
            column.iter().map(|v| v.unwrap_or(fallback)).collect()
        })
        .collect();
    let rows = (0..n)
        .map(|i| filled.iter().map(|column| column[i]).collect())
        .collect();

    Ok(FeatureTable {
        rows,
        timestamps: series.timestamps(),
        values,
        scopes: observations.iter().map(|o| o.scope).collect(),
        activity_types: observations.iter().map(|o| o.activity_type.clone()).collect(),
        company_ids: observations.iter().map(|o| o.company_id).collect(),
    })
}

/// Mean of the present entries, 0 when none are present
fn present_mean(column: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = column.iter().flatten().copied().collect();
    stats::mean(&present)
}

/// Position of a named column
pub fn column_index(name: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|c| *c == name)
}

impl FeatureTable {
    /// Feature rows, one per record
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Values of a single column
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let index = column_index(name)
            .ok_or_else(|| AnomalyError::FeatureMismatch(format!("unknown column '{}'", name)))?;
        Ok(self.rows.iter().map(|row| row[index]).collect())
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Raw emission values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn scope(&self, index: usize) -> Option<Scope> {
        self.scopes.get(index).copied().flatten()
    }

    pub fn activity_type(&self, index: usize) -> Option<&str> {
        self.activity_types.get(index).and_then(|a| a.as_deref())
    }

    pub fn company_id(&self, index: usize) -> Option<u64> {
        self.company_ids.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        FEATURE_COLUMNS.len()
    }
}
