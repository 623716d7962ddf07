//! Scenario engine holding the baseline and derived scenarios

use crate::comparison::{ScenarioComparison, BASELINE_KEY};
use crate::config::ScenarioConfig;
use crate::error::{Result, ScenarioError};
use crate::intervention::Intervention;
use crate::profile::EmissionsProfile;
use crate::sampling::{self, MonteCarloSummary};
use crate::scenario::{Scenario, ScenarioKind};
use crate::target::{reference_catalog, select_for_target, TargetSpec, TargetStrategy};
use tracing::{debug, info};

/// Projects baseline, intervention and target scenarios for one company profile
#[derive(Debug, Clone)]
pub struct ScenarioProjector {
    config: ScenarioConfig,
    catalog: Vec<Intervention>,
    profile: Option<EmissionsProfile>,
    baseline: Option<Scenario>,
    /// Stored in creation order; names are unique
    scenarios: Vec<Scenario>,
}

impl ScenarioProjector {
    /// Create a new projector using the reference intervention catalog
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            catalog: reference_catalog(),
            profile: None,
            baseline: None,
            scenarios: Vec::new(),
        })
    }

    /// Replace the catalog ranked by target scenarios
    pub fn with_catalog(mut self, catalog: Vec<Intervention>) -> Result<Self> {
        for intervention in &catalog {
            intervention.validate()?;
        }
        self.catalog = catalog;
        Ok(self)
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn catalog(&self) -> &[Intervention] {
        &self.catalog
    }

    pub fn baseline(&self) -> Option<&Scenario> {
        self.baseline.as_ref()
    }

    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    /// Project the business-as-usual trajectory
    ///
    /// Replacing the baseline discards previously derived scenarios, since their
    /// horizon and impact were measured against the old one.
    pub fn create_baseline(&mut self, profile: EmissionsProfile) -> Result<Scenario> {
        profile.validate()?;
        let baseline = Scenario::baseline(&profile);
        info!(
            current_emissions = profile.current_emissions,
            net_growth_rate = profile.net_growth_rate(),
            timeline_years = profile.timeline_years,
            "Baseline scenario created"
        );

        if !self.scenarios.is_empty() {
            debug!(discarded = self.scenarios.len(), "Dropping scenarios of the previous baseline");
            self.scenarios.clear();
        }
        self.profile = Some(profile);
        self.baseline = Some(baseline.clone());
        Ok(baseline)
    }

    /// Project a scenario with explicit interventions
    ///
    /// The name `"baseline"` is reserved for the baseline row of comparisons.
    pub fn create_intervention_scenario(
        &mut self,
        name: impl Into<String>,
        interventions: Vec<Intervention>,
    ) -> Result<Scenario> {
        let name = name.into();
        if name == BASELINE_KEY {
            return Err(ScenarioError::ReservedName(name));
        }
        let (baseline, profile) = self.require_baseline()?;
        for intervention in &interventions {
            intervention.validate()?;
        }

        let description = format!(
            "{} interventions over {} years",
            interventions.len(),
            baseline.timeline_years
        );
        let scenario = Scenario::projected(
            name,
            ScenarioKind::Intervention,
            description,
            interventions,
            None,
            baseline,
            profile,
            &self.config,
        )?;

        if let Some(impact) = &scenario.impact_metrics {
            info!(
                scenario = %scenario.name,
                total_reduction = impact.total_emission_reduction,
                total_cost = impact.total_intervention_cost,
                npv = impact.net_present_value,
                "Intervention scenario projected"
            );
        }
        self.store(scenario.clone());
        Ok(scenario)
    }

    /// Select interventions from the catalog to reach a reduction target
    ///
    /// `target_year` must lie within the baseline horizon; the scenario keeps the
    /// baseline's horizon.
    pub fn create_target_scenario(
        &mut self,
        target_reduction: f64,
        target_year: i32,
        strategy: TargetStrategy,
    ) -> Result<Scenario> {
        let (baseline, profile) = self.require_baseline()?;
        let epoch_year = baseline.epoch_year().unwrap_or_else(|| profile.resolved_epoch_year());
        let target_spec = TargetSpec::new(
            target_reduction,
            target_year,
            epoch_year,
            baseline.timeline_years,
            profile.current_emissions,
            strategy,
        )?;

        let selection = select_for_target(
            &self.catalog,
            target_reduction,
            strategy,
            self.config.budget_ceiling,
        );
        debug!(
            strategy = %strategy,
            selected = selection.interventions.len(),
            potential = selection.potential_reduction,
            budget_used = selection.budget_used,
            "Interventions selected for target"
        );

        let name = format!("{:.0}% Reduction by {}", target_reduction * 100.0, target_year);
        let description = format!(
            "Scenario to achieve {:.0}% emission reduction by {}",
            target_reduction * 100.0,
            target_year
        );
        let scenario = Scenario::projected(
            name,
            ScenarioKind::Target,
            description,
            selection.interventions,
            Some(target_spec),
            baseline,
            profile,
            &self.config,
        )?;

        if let Some(feasibility) = &scenario.feasibility_analysis {
            info!(
                scenario = %scenario.name,
                feasibility_score = feasibility.feasibility_score,
                achievable = feasibility.is_achievable,
                risk = %feasibility.risk_level,
                "Target scenario projected"
            );
        }
        self.store(scenario.clone());
        Ok(scenario)
    }

    /// Compare named scenarios with the baseline; every stored scenario when `names` is empty
    pub fn compare_scenarios(&self, names: &[&str]) -> Result<ScenarioComparison> {
        let (baseline, _) = self.require_baseline()?;
        let selected: Vec<&Scenario> = if names.is_empty() {
            self.scenarios.iter().collect()
        } else {
            names
                .iter()
                .map(|name| {
                    self.scenario(name)
                        .ok_or_else(|| ScenarioError::ScenarioNotFound(name.to_string()))
                })
                .collect::<Result<_>>()?
        };
        Ok(ScenarioComparison::build(baseline, &selected))
    }

    /// Monte-Carlo pass over a stored scenario's interventions
    pub fn sample_scenario(&self, name: &str, runs: usize, seed: u64) -> Result<MonteCarloSummary> {
        let (baseline, profile) = self.require_baseline()?;
        let scenario = self
            .scenario(name)
            .ok_or_else(|| ScenarioError::ScenarioNotFound(name.to_string()))?;
        let summary = sampling::sample(
            &scenario.name,
            &baseline.projections,
            profile,
            &scenario.interventions,
            runs,
            seed,
        )?;
        info!(
            scenario = %scenario.name,
            runs,
            seed,
            mean_total_reduction = summary.mean_total_reduction,
            "Monte-Carlo sampling finished"
        );
        Ok(summary)
    }

    /// Swap the configuration and recompute every stored scenario
    pub fn update_config(&mut self, config: ScenarioConfig) -> Result<()> {
        config.validate()?;
        self.config = config;

        let (Some(baseline), Some(profile)) = (&self.baseline, &self.profile) else {
            return Ok(());
        };
        for scenario in &mut self.scenarios {
            scenario.recompute(baseline, profile, &self.config)?;
        }
        debug!(recomputed = self.scenarios.len(), "Scenarios recomputed");
        Ok(())
    }

    fn require_baseline(&self) -> Result<(&Scenario, &EmissionsProfile)> {
        match (&self.baseline, &self.profile) {
            (Some(baseline), Some(profile)) => Ok((baseline, profile)),
            _ => Err(ScenarioError::BaselineMissing),
        }
    }

    fn store(&mut self, scenario: Scenario) {
        match self.scenarios.iter_mut().find(|s| s.name == scenario.name) {
            Some(existing) => *existing = scenario,
            None => self.scenarios.push(scenario),
        }
    }
}
