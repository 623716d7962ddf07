//! Initiative recommendations for a company profile
//!
//! A reference catalog of annotated initiatives is ranked against a company's
//! industry, size, budget, emissions and sustainability maturity. Each
//! recommendation carries a confidence, a short rationale, an impact and payback
//! estimate, and an implementation roadmap.

pub mod catalog;
pub mod engine;
pub mod profile;
pub mod roadmap;

pub use catalog::{CatalogEntry, CatalogSummary};
pub use engine::{
    ImpactEstimate, Recommendation, RecommendationConfig, RecommendationEngine, RecommendationReport,
};
pub use profile::{Band, CompanyProfile, CompanySize, Maturity, Pace, ProfileSummary, ScopeBreakdown};
pub use roadmap::{Roadmap, RoadmapPhase};
