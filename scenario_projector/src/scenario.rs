//! Scenario records returned to callers

use crate::config::{ScenarioConfig, UncertaintyMode};
use crate::error::Result;
use crate::impact::ImpactMetrics;
use crate::intervention::Intervention;
use crate::profile::EmissionsProfile;
use crate::projection::Projection;
use crate::target::{FeasibilityReport, TargetSelection, TargetSpec};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Baseline,
    Intervention,
    Target,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::Baseline => write!(f, "baseline"),
            ScenarioKind::Intervention => write!(f, "intervention"),
            ScenarioKind::Target => write!(f, "target"),
        }
    }
}

/// A projected scenario
///
/// The horizon is fixed by the baseline when the scenario is created. Projections and
/// metrics are derived data, rebuilt only through [`Scenario::recompute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub kind: ScenarioKind,
    pub description: String,
    pub timeline_years: u32,
    pub interventions: Vec<Intervention>,
    pub projections: Projection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_metrics: Option<ImpactMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility_analysis: Option<FeasibilityReport>,
}

impl Scenario {
    pub(crate) fn baseline(profile: &EmissionsProfile) -> Self {
        Self {
            name: "Business as Usual".to_string(),
            kind: ScenarioKind::Baseline,
            description: "Current trajectory without additional interventions".to_string(),
            timeline_years: profile.timeline_years,
            interventions: Vec::new(),
            projections: Projection::baseline(profile),
            impact_metrics: None,
            target: None,
            feasibility_analysis: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn projected(
        name: String,
        kind: ScenarioKind,
        description: String,
        interventions: Vec<Intervention>,
        target: Option<TargetSpec>,
        baseline: &Scenario,
        profile: &EmissionsProfile,
        config: &ScenarioConfig,
    ) -> Result<Self> {
        let mut scenario = Self {
            name,
            kind,
            description,
            timeline_years: baseline.timeline_years,
            interventions,
            projections: baseline.projections.clone(),
            impact_metrics: None,
            target,
            feasibility_analysis: None,
        };
        scenario.recompute(baseline, profile, config)?;
        Ok(scenario)
    }

    /// Rebuild projections and metrics from the interventions
    pub fn recompute(
        &mut self,
        baseline: &Scenario,
        profile: &EmissionsProfile,
        config: &ScenarioConfig,
    ) -> Result<()> {
        if self.kind == ScenarioKind::Baseline {
            self.projections = Projection::baseline(profile);
            return Ok(());
        }

        let mut rng = perturbation_rng(config.uncertainty);
        self.projections = Projection::with_interventions(
            &baseline.projections,
            profile,
            &self.interventions,
            rng.as_mut(),
        )?;
        self.impact_metrics = Some(ImpactMetrics::evaluate(
            &baseline.projections,
            &self.projections,
            config,
        ));

        if let Some(target_spec) = &self.target {
            let selection = TargetSelection {
                potential_reduction: self
                    .interventions
                    .iter()
                    .fold(0.0, |acc, i| acc + i.annual_reduction),
                budget_used: self.interventions.iter().fold(0.0, |acc, i| acc + i.cost),
                interventions: self.interventions.clone(),
            };
            self.feasibility_analysis = Some(FeasibilityReport::assess(
                target_spec,
                &selection,
                &self.projections,
                config.achievable_threshold,
            ));
        }
        Ok(())
    }

    /// Calendar year of projection year 0
    pub fn epoch_year(&self) -> Option<i32> {
        self.projections.years.first().copied()
    }
}

/// Generator for one projection pass, `None` when uncertainty is disabled
pub(crate) fn perturbation_rng(mode: UncertaintyMode) -> Option<StdRng> {
    match mode {
        UncertaintyMode::Disabled => None,
        UncertaintyMode::Seeded { seed } => Some(StdRng::seed_from_u64(seed)),
    }
}
