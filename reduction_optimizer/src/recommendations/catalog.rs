//! Initiative reference catalog

use super::profile::{Band, CompanySize, Pace};
use crate::initiative::Initiative;
use crate::{OptimizerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An initiative annotated with what the recommender matches companies on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub initiative: Initiative,
    #[serde(default = "medium_pace")]
    pub implementation_time: Pace,
    #[serde(default = "medium_band")]
    pub complexity: Band,
    #[serde(default = "medium_pace")]
    pub roi_timeframe: Pace,
    #[serde(default = "medium_band")]
    pub impact: Band,
    /// Industries the initiative is known to suit
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub company_sizes: Vec<CompanySize>,
    /// Initiatives that should already be in place
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

fn medium_pace() -> Pace {
    Pace::Medium
}

fn medium_band() -> Band {
    Band::Medium
}

impl CatalogEntry {
    pub fn new(initiative: Initiative) -> Self {
        Self {
            initiative,
            implementation_time: Pace::Medium,
            complexity: Band::Medium,
            roi_timeframe: Pace::Medium,
            impact: Band::Medium,
            industries: Vec::new(),
            company_sizes: Vec::new(),
            prerequisites: Vec::new(),
        }
    }

    pub fn with_timing(mut self, implementation_time: Pace, roi_timeframe: Pace) -> Self {
        self.implementation_time = implementation_time;
        self.roi_timeframe = roi_timeframe;
        self
    }

    pub fn with_complexity(mut self, complexity: Band) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_impact(mut self, impact: Band) -> Self {
        self.impact = impact;
        self
    }

    pub fn for_industry(mut self, industry: impl Into<String>) -> Self {
        self.industries.push(industry.into());
        self
    }

    pub fn for_size(mut self, size: CompanySize) -> Self {
        self.company_sizes.push(size);
        self
    }

    pub fn requires(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisites.push(prerequisite.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.initiative.name
    }

    pub fn cost_band(&self) -> Band {
        Band::from_cost(self.initiative.cost)
    }

    pub fn suits_industry(&self, industry: &str) -> bool {
        self.industries.iter().any(|i| i == industry)
    }

    pub fn suits_size(&self, size: CompanySize) -> bool {
        self.company_sizes.contains(&size)
    }

    /// Cost band, complexity, implementation time, log reduction and impact
    pub(crate) fn features(&self) -> [f64; 5] {
        [
            self.cost_band().level(),
            self.complexity.level(),
            self.implementation_time.level(),
            self.initiative.co2_reduction.ln_1p(),
            self.impact.level(),
        ]
    }

    fn validate(&self) -> Result<()> {
        let initiative = &self.initiative;
        if !initiative.cost.is_finite() || initiative.cost <= 0.0 {
            return Err(OptimizerError::InvalidCost {
                name: initiative.name.clone(),
                cost: initiative.cost,
            });
        }
        if !initiative.co2_reduction.is_finite() || initiative.co2_reduction < 0.0 {
            return Err(OptimizerError::InvalidReduction {
                name: initiative.name.clone(),
                reduction: initiative.co2_reduction,
            });
        }
        Ok(())
    }
}

/// Shape of a loaded catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub total_initiatives: usize,
    pub categories: Vec<String>,
    pub cost_bands: Vec<Band>,
}

/// Validate every entry and summarize the catalog
pub(crate) fn summarize(entries: &[CatalogEntry]) -> Result<CatalogSummary> {
    if entries.is_empty() {
        return Err(OptimizerError::EmptyCatalog);
    }
    for entry in entries {
        entry.validate()?;
    }

    let categories: BTreeSet<String> = entries
        .iter()
        .map(|e| e.initiative.category.clone().unwrap_or_else(|| "Other".to_string()))
        .collect();
    let cost_bands: BTreeSet<Band> = entries.iter().map(CatalogEntry::cost_band).collect();

    Ok(CatalogSummary {
        total_initiatives: entries.len(),
        categories: categories.into_iter().collect(),
        cost_bands: cost_bands.into_iter().collect(),
    })
}
