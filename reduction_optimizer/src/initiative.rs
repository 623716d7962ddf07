//! Reduction initiatives

use serde::{Deserialize, Serialize};

/// A candidate action with an upfront cost and a CO2e reduction potential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initiative {
    pub name: String,
    /// Implementation cost
    pub cost: f64,
    /// Reduction potential in tonnes CO2e
    pub co2_reduction: f64,
    /// Implementation risk in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Initiative {
    /// Create a new initiative without risk or tags
    pub fn new(name: impl Into<String>, cost: f64, co2_reduction: f64) -> Self {
        Self {
            name: name.into(),
            cost,
            co2_reduction,
            risk_score: None,
            category: None,
            tags: Vec::new(),
        }
    }

    pub fn with_risk(mut self, risk_score: f64) -> Self {
        self.risk_score = Some(risk_score);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Tonnes CO2e per unit of cost
    pub fn cost_effectiveness(&self) -> f64 {
        crate::utils::safe_ratio(self.co2_reduction, self.cost)
    }
}
