//! Observation series
//!
//! An [`ObservationSeries`] is always normalized: ordered by strictly increasing
//! timestamp, duplicates merged, and every value present. Construction goes through
//! [`ObservationSeries::new`], which performs the normalization from raw records whose
//! values may be missing.

use crate::{CoreError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// GHG accounting scope of an emission record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    /// Direct emissions
    #[serde(rename = "SCOPE_1")]
    Scope1,
    /// Purchased-energy emissions
    #[serde(rename = "SCOPE_2")]
    Scope2,
    /// Value-chain emissions
    #[serde(rename = "SCOPE_3")]
    Scope3,
}

impl Scope {
    /// Numeric code used as a categorical feature (1, 2 or 3)
    pub fn code(&self) -> u8 {
        match self {
            Scope::Scope1 => 1,
            Scope::Scope2 => 2,
            Scope::Scope3 => 3,
        }
    }

    /// Wire name of the scope
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Scope1 => "SCOPE_1",
            Scope::Scope2 => "SCOPE_2",
            Scope::Scope3 => "SCOPE_3",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "SCOPE_1" | "SCOPE1" | "1" => Ok(Scope::Scope1),
            "SCOPE_2" | "SCOPE2" | "2" => Ok(Scope::Scope2),
            "SCOPE_3" | "SCOPE3" | "3" => Ok(Scope::Scope3),
            _ => Err(CoreError::UnknownScope(s.to_string())),
        }
    }
}

/// A record as supplied by the caller, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
    pub scope: Option<Scope>,
    pub activity_type: Option<String>,
    pub company_id: Option<u64>,
}

impl RawObservation {
    /// Create a new untagged raw observation
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self {
            timestamp,
            value,
            scope: None,
            activity_type: None,
            company_id: None,
        }
    }

    /// Tag the observation with a scope
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Tag the observation with an activity type
    pub fn with_activity(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = Some(activity_type.into());
        self
    }

    /// Tag the observation with a company identifier
    pub fn with_company(mut self, company_id: u64) -> Self {
        self.company_id = Some(company_id);
        self
    }
}

/// A normalized observation with a guaranteed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub scope: Option<Scope>,
    pub activity_type: Option<String>,
    pub company_id: Option<u64>,
}

/// Normalized, strictly time-ordered series of observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    observations: Vec<Observation>,
}

/// Row layout accepted by the CSV reader
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "date")]
    timestamp: String,
    #[serde(alias = "emissions", default, deserialize_with = "csv::invalid_option")]
    value: Option<f64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    activity_type: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    company_id: Option<u64>,
}

impl ObservationSeries {
    /// Normalize raw records into a series
    ///
    /// Records are sorted by timestamp, records sharing a timestamp are merged by
    /// summing their values (tags of the first record are kept), and missing values are
    /// filled by forward carry, then backward carry for a missing prefix.
    pub fn new(raw: Vec<RawObservation>) -> Result<Self> {
        if raw.is_empty() {
            return Err(CoreError::EmptySeries);
        }
        if raw.iter().all(|r| r.value.map_or(true, |v| !v.is_finite())) {
            return Err(CoreError::NoValues);
        }

        let mut raw = raw;
        raw.sort_by_key(|r| r.timestamp);

        // Merge duplicates
        let mut merged: Vec<RawObservation> = Vec::with_capacity(raw.len());
        for record in raw {
            let value = record.value.filter(|v| v.is_finite());
            match merged.last_mut() {
                Some(last) if last.timestamp == record.timestamp => {
                    last.value = match (last.value, value) {
                        (Some(a), Some(b)) => Some(a + b),
                        (a, b) => a.or(b),
                    };
                }
                _ => merged.push(RawObservation { value, ..record }),
            }
        }

        // Forward carry, then backward carry for the leading gap
        let mut carried: Vec<Option<f64>> = Vec::with_capacity(merged.len());
        let mut last_seen = None;
        for record in &merged {
            if record.value.is_some() {
                last_seen = record.value;
            }
            carried.push(last_seen);
        }
        let first_present = carried.iter().flatten().next().copied().ok_or(CoreError::NoValues)?;

        let observations = merged
            .into_iter()
            .zip(carried)
            .map(|(record, value)| Observation {
                timestamp: record.timestamp,
                value: value.unwrap_or(first_present),
                scope: record.scope,
                activity_type: record.activity_type,
                company_id: record.company_id,
            })
            .collect();

        Ok(Self { observations })
    }

    /// Build an untagged series from timestamp/value pairs
    pub fn from_points(points: &[(DateTime<Utc>, f64)]) -> Result<Self> {
        Self::new(
            points
                .iter()
                .map(|&(ts, v)| RawObservation::new(ts, Some(v)))
                .collect(),
        )
    }

    /// Build an untagged daily series starting at `start`
    pub fn from_daily_values(start: DateTime<Utc>, values: &[f64]) -> Result<Self> {
        let points: Vec<(DateTime<Utc>, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + Duration::days(i as i64), v))
            .collect();
        Self::from_points(&points)
    }

    /// Read observations from CSV with a header row
    ///
    /// Recognised columns: `timestamp` (or `date`), `value` (or `emissions`), and the
    /// optional `scope`, `activity_type`, `company_id`. Empty or unparsable values are
    /// treated as missing and filled during normalization.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut raw = Vec::new();
        for record in csv_reader.deserialize::<CsvRecord>() {
            let record = record?;
            let scope = match record.scope.as_deref() {
                Some(s) if !s.is_empty() => Some(s.parse::<Scope>()?),
                _ => None,
            };
            raw.push(RawObservation {
                timestamp: parse_timestamp(&record.timestamp)?,
                value: record.value,
                scope,
                activity_type: record.activity_type.filter(|a| !a.is_empty()),
                company_id: record.company_id,
            });
        }

        Self::new(raw)
    }

    /// Read observations from a CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(io::BufReader::new(file))
    }

    /// Aggregate to one observation per calendar day
    ///
    /// Days are summed; calendar days missing between the first and last observation
    /// carry the previous day's total forward. Timestamps are set to midnight UTC and
    /// tags are dropped.
    pub fn daily_totals(&self) -> Self {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for obs in &self.observations {
            *totals.entry(obs.timestamp.date_naive()).or_insert(0.0) += obs.value;
        }

        let mut observations = Vec::with_capacity(totals.len());
        let mut previous: Option<(NaiveDate, f64)> = None;
        for (&date, &total) in &totals {
            if let Some((prev_date, prev_total)) = previous {
                let mut gap = prev_date + Duration::days(1);
                while gap < date {
                    observations.push(daily_observation(gap, prev_total));
                    gap += Duration::days(1);
                }
            }
            observations.push(daily_observation(date, total));
            previous = Some((date, total));
        }

        Self { observations }
    }

    /// Sub-series covering positions `start..end`
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        if start >= end || end > self.observations.len() {
            return Err(CoreError::InvalidInput(format!(
                "Invalid slice {}..{} of a series with {} observations",
                start,
                end,
                self.observations.len()
            )));
        }
        Ok(Self {
            observations: self.observations[start..end].to_vec(),
        })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Values in time order
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Timestamps in time order
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.observations.iter().map(|o| o.timestamp).collect()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.observations.first().map(|o| o.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.observations.last().map(|o| o.timestamp)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

fn daily_observation(date: NaiveDate, value: f64) -> Observation {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    Observation {
        timestamp: Utc.from_utc_datetime(&midnight),
        value,
        scope: None,
        activity_type: None,
        company_id: None,
    }
}

/// Parse an RFC 3339 timestamp, `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD` date
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)));
    }

    Err(CoreError::MalformedTimestamp(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_normalization_sorts_and_merges() {
        let raw = vec![
            RawObservation::new(ts(3), Some(3.0)),
            RawObservation::new(ts(1), Some(1.0)),
            RawObservation::new(ts(3), Some(4.0)),
        ];
        let series = ObservationSeries::new(raw).unwrap();
        assert_eq!(series.values(), vec![1.0, 7.0]);
        assert_eq!(series.timestamps(), vec![ts(1), ts(3)]);
    }

    #[test]
    fn test_forward_and_backward_fill() {
        let raw = vec![
            RawObservation::new(ts(1), None),
            RawObservation::new(ts(2), Some(5.0)),
            RawObservation::new(ts(3), None),
            RawObservation::new(ts(4), Some(8.0)),
        ];
        let series = ObservationSeries::new(raw).unwrap();
        assert_eq!(series.values(), vec![5.0, 5.0, 5.0, 8.0]);
    }

    #[test]
    fn test_empty_and_valueless() {
        assert!(matches!(
            ObservationSeries::new(vec![]),
            Err(CoreError::EmptySeries)
        ));
        assert!(matches!(
            ObservationSeries::new(vec![RawObservation::new(ts(1), None)]),
            Err(CoreError::NoValues)
        ));
    }

    #[test]
    fn test_daily_totals_fill_gaps() {
        let series = ObservationSeries::from_points(&[
            (ts(1), 1.0),
            (ts(1) + Duration::hours(6), 2.0),
            (ts(4), 5.0),
        ])
        .unwrap();
        let daily = series.daily_totals();
        assert_eq!(daily.values(), vec![3.0, 3.0, 3.0, 5.0]);
        assert_eq!(daily.len(), 4);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-05").is_ok());
        assert!(parse_timestamp("2024-01-05 12:30:00").is_ok());
        assert!(parse_timestamp("2024-01-05T12:30:00Z").is_ok());
        assert!(matches!(
            parse_timestamp("05/01/2024"),
            Err(CoreError::MalformedTimestamp(_))
        ));
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("SCOPE_2".parse::<Scope>().unwrap(), Scope::Scope2);
        assert_eq!("scope 3".parse::<Scope>().unwrap(), Scope::Scope3);
        assert!("SCOPE_9".parse::<Scope>().is_err());
        assert_eq!(Scope::Scope1.code(), 1);
    }
}
