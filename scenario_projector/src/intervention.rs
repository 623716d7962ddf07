//! Time-phased reduction interventions

use crate::error::{Result, ScenarioError};
use emission_core::Scope;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    #[default]
    Efficiency,
    Renewable,
    Transportation,
    FuelSwitch,
    Behavioral,
    Other,
}

impl fmt::Display for InterventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterventionKind::Efficiency => "efficiency",
            InterventionKind::Renewable => "renewable",
            InterventionKind::Transportation => "transportation",
            InterventionKind::FuelSwitch => "fuel_switch",
            InterventionKind::Behavioral => "behavioral",
            InterventionKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// A reduction action attached to a scenario
///
/// Effectiveness ramps up linearly over `ramp_duration` years from `start_offset`, then
/// decays geometrically by `decay_rate` per year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub name: String,
    #[serde(default)]
    pub kind: InterventionKind,
    /// Years after the scenario epoch before the intervention starts
    #[serde(default = "default_start_offset")]
    pub start_offset: u32,
    #[serde(default = "default_ramp_duration")]
    pub ramp_duration: u32,
    /// Fraction of baseline emissions removed at full effect
    pub annual_reduction: f64,
    /// Tonnes removed once, in the first active year
    #[serde(default)]
    pub one_time_reduction: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub decay_rate: f64,
    /// Standard deviation of the effectiveness perturbation
    #[serde(default = "default_uncertainty")]
    pub uncertainty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

fn default_start_offset() -> u32 {
    1
}

fn default_ramp_duration() -> u32 {
    1
}

fn default_uncertainty() -> f64 {
    0.1
}

impl Intervention {
    /// Create a new intervention starting next year with a one-year ramp
    pub fn new(name: impl Into<String>, annual_reduction: f64, cost: f64) -> Self {
        Self {
            name: name.into(),
            kind: InterventionKind::default(),
            start_offset: default_start_offset(),
            ramp_duration: default_ramp_duration(),
            annual_reduction,
            one_time_reduction: 0.0,
            cost,
            decay_rate: 0.0,
            uncertainty: default_uncertainty(),
            scope: None,
            rationale: None,
        }
    }

    pub fn with_kind(mut self, kind: InterventionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn starting_at(mut self, start_offset: u32) -> Self {
        self.start_offset = start_offset;
        self
    }

    pub fn with_ramp(mut self, ramp_duration: u32) -> Self {
        self.ramp_duration = ramp_duration;
        self
    }

    pub fn with_one_time_reduction(mut self, tonnes: f64) -> Self {
        self.one_time_reduction = tonnes;
        self
    }

    pub fn with_decay(mut self, decay_rate: f64) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    pub fn with_uncertainty(mut self, uncertainty: f64) -> Self {
        self.uncertainty = uncertainty;
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Reject values outside their documented ranges
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: String| {
            Err(ScenarioError::InvalidIntervention {
                name: self.name.clone(),
                reason,
            })
        };

        if self.name.trim().is_empty() {
            return reject("name must not be empty".to_string());
        }
        if self.ramp_duration == 0 {
            return reject("ramp_duration must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.annual_reduction) {
            return reject(format!("annual_reduction {} outside [0, 1]", self.annual_reduction));
        }
        if !(self.one_time_reduction.is_finite() && self.one_time_reduction >= 0.0) {
            return reject(format!("one_time_reduction {} is negative", self.one_time_reduction));
        }
        if !(self.cost.is_finite() && self.cost >= 0.0) {
            return reject(format!("cost {} is negative", self.cost));
        }
        if !(0.0..1.0).contains(&self.decay_rate) {
            return reject(format!("decay_rate {} outside [0, 1)", self.decay_rate));
        }
        if !(0.0..=1.0).contains(&self.uncertainty) {
            return reject(format!("uncertainty {} outside [0, 1]", self.uncertainty));
        }
        Ok(())
    }

    /// Effectiveness multiplier in projection year `year`, before perturbation
    ///
    /// Zero before the start, `(k + 1) / ramp` in ramp year `k`, then
    /// `(1 - decay)^n` in the `n`-th year after the ramp.
    pub fn effectiveness(&self, year: u32) -> f64 {
        if year < self.start_offset {
            return 0.0;
        }
        let since_start = year - self.start_offset;
        if since_start < self.ramp_duration {
            f64::from(since_start + 1) / f64::from(self.ramp_duration)
        } else {
            let after_ramp = since_start - self.ramp_duration;
            (1.0 - self.decay_rate).powi(after_ramp as i32)
        }
    }

    /// Whether `year` is the first active year
    pub fn is_first_active_year(&self, year: u32) -> bool {
        year == self.start_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0.0)]
    #[case(1, 1.0 / 3.0)]
    #[case(3, 1.0)]
    #[case(4, 1.0)]
    #[case(5, 0.9)]
    #[case(6, 0.81)]
    fn test_ramp_then_decay(#[case] year: u32, #[case] expected: f64) {
        let intervention = Intervention::new("Heat recovery", 0.1, 1_000.0)
            .starting_at(1)
            .with_ramp(3)
            .with_decay(0.1);
        assert_abs_diff_eq!(intervention.effectiveness(year), expected, epsilon = 1e-12);
    }

    #[rstest]
    #[case(Intervention::new("", 0.1, 0.0))]
    #[case(Intervention::new("Ramp", 0.1, 0.0).with_ramp(0))]
    #[case(Intervention::new("Fraction", 1.5, 0.0))]
    #[case(Intervention::new("Cost", 0.1, -5.0))]
    #[case(Intervention::new("Decay", 0.1, 0.0).with_decay(1.0))]
    #[case(Intervention::new("Noise", 0.1, 0.0).with_uncertainty(2.0))]
    #[case(Intervention::new("Once", 0.1, 0.0).with_one_time_reduction(-1.0))]
    fn test_rejects_invalid(#[case] intervention: Intervention) {
        assert!(matches!(
            intervention.validate(),
            Err(ScenarioError::InvalidIntervention { .. })
        ));
    }

    #[test]
    fn test_deserialize_defaults() {
        let intervention: Intervention =
            serde_json::from_str(r#"{"name": "Rooftop solar", "annual_reduction": 0.15}"#).unwrap();
        assert_eq!(intervention.start_offset, 1);
        assert_eq!(intervention.ramp_duration, 1);
        assert_eq!(intervention.kind, InterventionKind::Efficiency);
        assert!(intervention.validate().is_ok());
    }
}
