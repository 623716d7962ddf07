//! Company profiles and sustainability maturity

use serde::{Deserialize, Serialize};

/// Three-level band used for budgets, costs, complexity and impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    /// Band of an upfront cost: below 50 000 is low, below 200 000 is medium
    pub fn from_cost(cost: f64) -> Self {
        if cost < 50_000.0 {
            Band::Low
        } else if cost < 200_000.0 {
            Band::Medium
        } else {
            Band::High
        }
    }

    /// Ordinal level, 1 to 3
    pub fn level(self) -> f64 {
        match self {
            Band::Low => 1.0,
            Band::Medium => 2.0,
            Band::High => 3.0,
        }
    }
}

/// Implementation or payback horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pace {
    Short,
    Medium,
    Long,
}

impl Pace {
    pub fn level(self) -> f64 {
        match self {
            Pace::Short => 1.0,
            Pace::Medium => 2.0,
            Pace::Long => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

impl CompanySize {
    /// Scale applied to catalog reductions and costs
    pub fn multiplier(self) -> f64 {
        match self {
            CompanySize::Small => 0.5,
            CompanySize::Medium => 1.0,
            CompanySize::Large => 2.0,
        }
    }
}

/// Sustainability maturity derived from a 0-100 practice score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Maturity {
    Starter,
    Beginner,
    Intermediate,
    Advanced,
}

impl Maturity {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => Maturity::Advanced,
            s if s >= 50 => Maturity::Intermediate,
            s if s >= 20 => Maturity::Beginner,
            _ => Maturity::Starter,
        }
    }

    /// Initiative complexity a company at this level handles comfortably
    pub fn preferred_complexity(self) -> Band {
        match self {
            Maturity::Starter | Maturity::Beginner => Band::Low,
            Maturity::Intermediate => Band::Medium,
            Maturity::Advanced => Band::High,
        }
    }

    pub fn prefers_quick_wins(self) -> bool {
        matches!(self, Maturity::Starter | Maturity::Beginner)
    }
}

/// Annual emissions split by GHG Protocol scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeBreakdown {
    pub scope1: f64,
    pub scope2: f64,
    pub scope3: f64,
}

/// What the recommender knows about a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub industry: String,
    pub size: CompanySize,
    /// Current annual emissions in tonnes CO2e
    pub annual_emissions: f64,
    pub budget: Band,
    /// Names of initiatives already in place
    #[serde(default)]
    pub current_initiatives: Vec<String>,
    #[serde(default)]
    pub emission_breakdown: ScopeBreakdown,
    #[serde(default)]
    pub has_emission_tracking: bool,
    #[serde(default)]
    pub has_reduction_targets: bool,
    #[serde(default)]
    pub sustainability_reporting: bool,
}

impl CompanyProfile {
    pub fn new(industry: impl Into<String>, size: CompanySize, annual_emissions: f64, budget: Band) -> Self {
        Self {
            company_id: None,
            industry: industry.into(),
            size,
            annual_emissions,
            budget,
            current_initiatives: Vec::new(),
            emission_breakdown: ScopeBreakdown::default(),
            has_emission_tracking: false,
            has_reduction_targets: false,
            sustainability_reporting: false,
        }
    }

    pub fn with_initiative(mut self, name: impl Into<String>) -> Self {
        self.current_initiatives.push(name.into());
        self
    }

    pub fn with_practices(mut self, tracking: bool, targets: bool, reporting: bool) -> Self {
        self.has_emission_tracking = tracking;
        self.has_reduction_targets = targets;
        self.sustainability_reporting = reporting;
        self
    }

    /// Practice score: 10 per running initiative (at most 40), 20 each for
    /// emission tracking, reduction targets and sustainability reporting
    pub fn maturity_score(&self) -> u32 {
        let initiatives = (self.current_initiatives.len().min(4) * 10) as u32;
        let practices = [
            self.has_emission_tracking,
            self.has_reduction_targets,
            self.sustainability_reporting,
        ]
        .iter()
        .filter(|&&flag| flag)
        .count() as u32;
        initiatives + 20 * practices
    }

    pub fn maturity(&self) -> Maturity {
        Maturity::from_score(self.maturity_score())
    }

    pub fn has_initiative(&self, name: &str) -> bool {
        self.current_initiatives.iter().any(|current| current == name)
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            industry: self.industry.clone(),
            size: self.size,
            maturity: self.maturity(),
            annual_emissions: self.annual_emissions,
            budget: self.budget,
            current_initiatives_count: self.current_initiatives.len(),
        }
    }
}

/// Condensed profile echoed back with recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub industry: String,
    pub size: CompanySize,
    pub maturity: Maturity,
    pub annual_emissions: f64,
    pub budget: Band,
    pub current_initiatives_count: usize,
}
