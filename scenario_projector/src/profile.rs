//! Company emissions profile driving the baseline trajectory

use crate::error::{Result, ScenarioError};
use chrono::{Datelike, Duration, Utc};
use emission_core::stats::safe_ratio;
use emission_core::ObservationSeries;
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: i64 = 365;

/// Starting point and growth assumptions of a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsProfile {
    /// Annual emissions in the epoch year, tonnes CO2e
    pub current_emissions: f64,
    /// Annual business growth
    #[serde(default = "default_business_growth")]
    pub business_growth_rate: f64,
    /// Annual efficiency gain without additional interventions
    #[serde(default = "default_natural_efficiency")]
    pub natural_efficiency_rate: f64,
    /// Observed year-over-year change in emissions, informational
    #[serde(default = "default_historical_growth")]
    pub historical_growth_rate: f64,
    #[serde(default = "default_timeline")]
    pub timeline_years: u32,
    /// Calendar year of projection year 0; the current year when unset
    #[serde(default)]
    pub epoch_year: Option<i32>,
}

fn default_business_growth() -> f64 {
    0.05
}

fn default_natural_efficiency() -> f64 {
    0.01
}

fn default_historical_growth() -> f64 {
    0.02
}

fn default_timeline() -> u32 {
    10
}

impl EmissionsProfile {
    /// Create a new profile with the default growth assumptions
    pub fn new(current_emissions: f64) -> Self {
        Self {
            current_emissions,
            business_growth_rate: default_business_growth(),
            natural_efficiency_rate: default_natural_efficiency(),
            historical_growth_rate: default_historical_growth(),
            timeline_years: default_timeline(),
            epoch_year: None,
        }
    }

    /// Profile from observed emissions
    ///
    /// Current emissions are the total of the trailing 365 days. With at least two years
    /// of data the historical growth rate compares the trailing year with the one before.
    /// The epoch is the year of the last observation.
    pub fn from_series(series: &ObservationSeries) -> Result<Self> {
        let daily = series.daily_totals();
        let last = daily
            .last_timestamp()
            .ok_or(ScenarioError::Core(emission_core::CoreError::EmptySeries))?;
        let first = daily
            .first_timestamp()
            .ok_or(ScenarioError::Core(emission_core::CoreError::EmptySeries))?;

        let year_start = last - Duration::days(DAYS_PER_YEAR);
        let prior_start = year_start - Duration::days(DAYS_PER_YEAR);
        let mut current = 0.0;
        let mut prior = 0.0;
        for observation in daily.observations() {
            if observation.timestamp > year_start {
                current += observation.value;
            } else if observation.timestamp > prior_start {
                prior += observation.value;
            }
        }

        let mut profile = Self::new(current).with_epoch_year(last.year());
        if last - first >= Duration::days(2 * DAYS_PER_YEAR - 1) {
            profile.historical_growth_rate = safe_ratio(current - prior, prior);
        }
        profile.validate()?;
        Ok(profile)
    }

    pub fn with_growth(mut self, business_growth_rate: f64, natural_efficiency_rate: f64) -> Self {
        self.business_growth_rate = business_growth_rate;
        self.natural_efficiency_rate = natural_efficiency_rate;
        self
    }

    pub fn with_timeline(mut self, timeline_years: u32) -> Self {
        self.timeline_years = timeline_years;
        self
    }

    pub fn with_epoch_year(mut self, epoch_year: i32) -> Self {
        self.epoch_year = Some(epoch_year);
        self
    }

    /// Business growth net of natural efficiency gains
    pub fn net_growth_rate(&self) -> f64 {
        self.business_growth_rate - self.natural_efficiency_rate
    }

    /// Calendar year of projection year 0
    pub fn resolved_epoch_year(&self) -> i32 {
        self.epoch_year.unwrap_or_else(|| Utc::now().year())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.current_emissions.is_finite() && self.current_emissions >= 0.0) {
            return Err(ScenarioError::InvalidProfile(format!(
                "current_emissions must be non-negative, got {}",
                self.current_emissions
            )));
        }
        for (field, rate) in [
            ("business_growth_rate", self.business_growth_rate),
            ("natural_efficiency_rate", self.natural_efficiency_rate),
            ("historical_growth_rate", self.historical_growth_rate),
        ] {
            if !rate.is_finite() {
                return Err(ScenarioError::InvalidProfile(format!("{} must be finite", field)));
            }
        }
        if self.business_growth_rate <= -1.0 || self.net_growth_rate() <= -1.0 {
            return Err(ScenarioError::InvalidProfile(
                "growth rates must keep annual factors positive".to_string(),
            ));
        }
        if self.timeline_years == 0 {
            return Err(ScenarioError::InvalidProfile(
                "timeline_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    #[test]
    fn test_net_growth() {
        let profile = EmissionsProfile::new(10_000.0);
        assert_abs_diff_eq!(profile.net_growth_rate(), 0.04, epsilon = 1e-12);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_timeline() {
        let profile = EmissionsProfile::new(10_000.0).with_timeline(0);
        assert!(matches!(profile.validate(), Err(ScenarioError::InvalidProfile(_))));
    }

    #[test]
    fn test_from_series() {
        let start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        // Two years of 10 t/day followed by a year of 12 t/day
        let values: Vec<f64> = (0..730).map(|i| if i < 365 { 10.0 } else { 12.0 }).collect();
        let series = ObservationSeries::from_daily_values(start, &values).unwrap();

        let profile = EmissionsProfile::from_series(&series).unwrap();
        assert_abs_diff_eq!(profile.current_emissions, 365.0 * 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(profile.historical_growth_rate, 0.2, epsilon = 1e-9);
        assert_eq!(profile.epoch_year, Some(2023));
    }
}
