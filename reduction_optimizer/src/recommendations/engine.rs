//! Personalised initiative recommendations
//!
//! Every catalog entry is rated in `[0, 1]` by three scorers:
//!
//! - **content**: cosine similarity between the company's preferences and the entry,
//!   both standardized with catalog statistics
//! - **peer**: fit with the industries and company sizes the entry is known to suit
//! - **rules**: maturity, budget, emission scale and quick-win heuristics
//!
//! The weighted blend of the three ranks the entries.

use super::catalog::{self, CatalogEntry, CatalogSummary};
use super::profile::{Band, CompanyProfile, Maturity, Pace, ProfileSummary};
use super::roadmap::Roadmap;
use crate::utils::{rank_descending, safe_ratio};
use crate::{OptimizerError, Result};
use emission_core::stats::{mean, population_std};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const FEATURES: usize = 5;

/// Scorer weights and economic assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub content_weight: f64,
    pub peer_weight: f64,
    pub rules_weight: f64,
    /// Savings per avoided tonne used for payback estimates
    pub carbon_price: f64,
    /// Annual emissions above which high-impact entries get a bonus
    pub high_emitter_threshold: f64,
    /// Share of annual emissions a well-sized initiative removes
    pub expected_reduction_share: f64,
    pub max_rationale: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            content_weight: 0.4,
            peer_weight: 0.3,
            rules_weight: 0.3,
            carbon_price: 50.0,
            high_emitter_threshold: 10_000.0,
            expected_reduction_share: 0.1,
            max_rationale: 3,
        }
    }
}

impl RecommendationConfig {
    pub fn validate(&self) -> Result<()> {
        let weights = [self.content_weight, self.peer_weight, self.rules_weight];
        let sum: f64 = weights.iter().fold(0.0, |acc, w| acc + w);
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || (sum - 1.0).abs() > 1e-6 {
            return Err(OptimizerError::InvalidWeights(format!(
                "scorer weights must be non-negative and sum to 1, got {:.3}/{:.3}/{:.3}",
                self.content_weight, self.peer_weight, self.rules_weight
            )));
        }
        if !(self.carbon_price.is_finite() && self.carbon_price > 0.0) {
            return Err(OptimizerError::InvalidParameter(format!(
                "carbon price must be positive, got {}",
                self.carbon_price
            )));
        }
        if !(0.0..=1.0).contains(&self.expected_reduction_share) {
            return Err(OptimizerError::InvalidParameter(format!(
                "expected reduction share must lie in [0, 1], got {}",
                self.expected_reduction_share
            )));
        }
        Ok(())
    }
}

/// What implementing an entry would mean for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub estimated_co2_reduction: f64,
    /// Share of current annual emissions, in percent
    pub reduction_percentage: f64,
    pub estimated_cost: f64,
    pub cost_per_tonne: f64,
    /// `None` when the entry saves nothing
    pub payback_years: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub entry: CatalogEntry,
    pub score: f64,
    pub confidence: f64,
    pub content_score: f64,
    pub peer_score: f64,
    pub rules_score: f64,
    pub rationale: Vec<String>,
    pub estimated_impact: ImpactEstimate,
    pub roadmap: Roadmap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    /// Best first
    pub recommendations: Vec<Recommendation>,
    /// Entries scored after filtering
    pub total_considered: usize,
    pub profile_summary: ProfileSummary,
    pub methods_used: Vec<String>,
    pub filters_applied: Vec<String>,
}

/// Column statistics of the catalog feature matrix
#[derive(Debug, Clone)]
struct FeatureScaler {
    means: [f64; FEATURES],
    stds: [f64; FEATURES],
}

impl FeatureScaler {
    fn fit(entries: &[CatalogEntry]) -> Self {
        let rows: Vec<[f64; FEATURES]> = entries.iter().map(CatalogEntry::features).collect();
        let mut means = [0.0; FEATURES];
        let mut stds = [0.0; FEATURES];
        for j in 0..FEATURES {
            let column: Vec<f64> = rows.iter().map(|row| row[j]).collect();
            means[j] = mean(&column);
            stds[j] = population_std(&column);
        }
        Self { means, stds }
    }

    /// Constant columns map to 0
    fn transform(&self, features: &[f64; FEATURES]) -> [f64; FEATURES] {
        let mut scaled = [0.0; FEATURES];
        for j in 0..FEATURES {
            if self.stds[j] > 1e-12 {
                scaled[j] = (features[j] - self.means[j]) / self.stds[j];
            }
        }
        scaled
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot = a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + x * y);
    let norm_a = a.iter().fold(0.0, |acc, x| acc + x * x).sqrt();
    let norm_b = b.iter().fold(0.0, |acc, x| acc + x * x).sqrt();
    safe_ratio(dot, norm_a * norm_b)
}

/// Ranks catalog entries for a company profile
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    config: RecommendationConfig,
    catalog: Vec<CatalogEntry>,
    scaler: Option<FeatureScaler>,
}

impl RecommendationEngine {
    pub fn new(config: RecommendationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            catalog: Vec::new(),
            scaler: None,
        })
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Validate and install the reference catalog, replacing any previous one
    pub fn load_catalog(&mut self, entries: Vec<CatalogEntry>) -> Result<CatalogSummary> {
        let summary = catalog::summarize(&entries)?;
        self.scaler = Some(FeatureScaler::fit(&entries));
        self.catalog = entries;

        info!(
            total_initiatives = summary.total_initiatives,
            categories = summary.categories.len(),
            "Loaded initiative catalog"
        );
        Ok(summary)
    }

    /// Rank catalog entries for `profile`, returning at most `limit`
    ///
    /// With `filter_existing`, entries the company already runs are skipped.
    pub fn recommend(
        &self,
        profile: &CompanyProfile,
        limit: usize,
        filter_existing: bool,
    ) -> Result<RecommendationReport> {
        let scaler = self.scaler.as_ref().ok_or(OptimizerError::CatalogNotLoaded)?;
        if limit == 0 {
            return Err(OptimizerError::InvalidParameter(
                "recommendation limit must be positive".to_string(),
            ));
        }

        let maturity = profile.maturity();
        let preferences = scaler.transform(&self.preferences(profile, maturity));

        let candidates: Vec<Recommendation> = self
            .catalog
            .iter()
            .filter(|entry| !(filter_existing && profile.has_initiative(entry.name())))
            .map(|entry| {
                let content = (1.0 + cosine_similarity(&preferences, &scaler.transform(&entry.features()))) / 2.0;
                let peer = peer_score(profile, entry);
                let rules = self.rules_score(profile, maturity, entry);
                let score = self.config.content_weight * content
                    + self.config.peer_weight * peer
                    + self.config.rules_weight * rules;
                debug!(initiative = entry.name(), content, peer, rules, score, "Scored initiative");

                Recommendation {
                    entry: entry.clone(),
                    score,
                    confidence: confidence(profile, entry),
                    content_score: content,
                    peer_score: peer,
                    rules_score: rules,
                    rationale: self.rationale(profile, maturity, entry),
                    estimated_impact: self.estimate_impact(profile, entry),
                    roadmap: Roadmap::for_pace(entry.implementation_time),
                }
            })
            .collect();

        let total_considered = candidates.len();
        let scores: Vec<f64> = candidates.iter().map(|c| c.score).collect();
        let order = rank_descending(&scores);
        let mut slots: Vec<Option<Recommendation>> = candidates.into_iter().map(Some).collect();
        let recommendations: Vec<Recommendation> = order
            .into_iter()
            .take(limit)
            .filter_map(|i| slots[i].take())
            .collect();

        info!(
            total_considered,
            returned = recommendations.len(),
            maturity = ?maturity,
            "Generated recommendations"
        );

        Ok(RecommendationReport {
            recommendations,
            total_considered,
            profile_summary: profile.summary(),
            methods_used: vec!["content_based".to_string(), "peer_fit".to_string(), "rules_based".to_string()],
            filters_applied: if filter_existing {
                vec!["existing_initiatives".to_string()]
            } else {
                Vec::new()
            },
        })
    }

    /// The entry a company would ideally be offered, in catalog feature space
    fn preferences(&self, profile: &CompanyProfile, maturity: Maturity) -> [f64; FEATURES] {
        let preferred_reduction = (profile.annual_emissions * self.config.expected_reduction_share).max(0.0);
        let preferred_impact = if profile.annual_emissions > self.config.high_emitter_threshold {
            Band::High
        } else {
            Band::Medium
        };
        [
            profile.budget.level(),
            maturity.preferred_complexity().level(),
            maturity.preferred_complexity().level(),
            preferred_reduction.ln_1p(),
            preferred_impact.level(),
        ]
    }

    fn rules_score(&self, profile: &CompanyProfile, maturity: Maturity, entry: &CatalogEntry) -> f64 {
        let mut score: f64 = 0.5;

        score += match (maturity, entry.complexity) {
            (Maturity::Starter, Band::Low) => 0.3,
            (Maturity::Advanced, Band::High) => 0.2,
            _ => 0.0,
        };
        score += match (profile.budget, entry.cost_band()) {
            (Band::Low, Band::Low) => 0.3,
            (Band::Medium, Band::Medium) => 0.2,
            (Band::High, Band::High) => 0.1,
            (Band::High, Band::Medium) => 0.15,
            (Band::High, Band::Low) => 0.2,
            _ => 0.0,
        };
        if profile.annual_emissions > self.config.high_emitter_threshold && entry.impact == Band::High {
            score += 0.2;
        }
        if maturity.prefers_quick_wins() && entry.implementation_time == Pace::Short {
            score += 0.2;
        }

        score.min(1.0)
    }

    fn rationale(&self, profile: &CompanyProfile, maturity: Maturity, entry: &CatalogEntry) -> Vec<String> {
        let mut reasons = Vec::new();
        if entry.suits_industry(&profile.industry) {
            reasons.push(format!("Well-suited for {} companies", profile.industry));
        }
        match (maturity, entry.complexity) {
            (Maturity::Starter, Band::Low) => {
                reasons.push("Perfect starting point for sustainability journey".to_string())
            }
            (Maturity::Advanced, Band::High) => {
                reasons.push("Advanced initiative matching your sustainability maturity".to_string())
            }
            _ => {}
        }
        if entry.initiative.co2_reduction > 1000.0 {
            reasons.push("High carbon reduction potential".to_string());
        }
        if entry.cost_band() == Band::Low && entry.impact >= Band::Medium {
            reasons.push("Cost-effective solution with good impact".to_string());
        }
        if entry.implementation_time == Pace::Short {
            reasons.push("Can be implemented quickly for immediate impact".to_string());
        }
        if entry.roi_timeframe == Pace::Short {
            reasons.push("Quick return on investment expected".to_string());
        }

        if reasons.is_empty() {
            reasons.push("Recommended based on company profile analysis".to_string());
        }
        reasons.truncate(self.config.max_rationale.max(1));
        reasons
    }

    fn estimate_impact(&self, profile: &CompanyProfile, entry: &CatalogEntry) -> ImpactEstimate {
        let multiplier = profile.size.multiplier();
        let reduction = entry.initiative.co2_reduction * multiplier;
        let cost = entry.initiative.cost * multiplier;
        let annual_savings = reduction * self.config.carbon_price;

        ImpactEstimate {
            estimated_co2_reduction: reduction,
            reduction_percentage: safe_ratio(reduction, profile.annual_emissions) * 100.0,
            estimated_cost: cost,
            cost_per_tonne: safe_ratio(cost, reduction),
            payback_years: (annual_savings > 0.0).then(|| cost / annual_savings),
        }
    }
}

fn peer_score(profile: &CompanyProfile, entry: &CatalogEntry) -> f64 {
    let mut score = 0.5;
    if entry.suits_industry(&profile.industry) {
        score += 0.3;
    }
    if entry.suits_size(profile.size) {
        score += 0.2;
    }
    score
}

/// How sure the fit is, in `[0, 1]`
fn confidence(profile: &CompanyProfile, entry: &CatalogEntry) -> f64 {
    let mut confidence: f64 = 0.5;
    if entry.suits_industry(&profile.industry) {
        confidence += 0.2;
    }
    if entry.suits_size(profile.size) {
        confidence += 0.15;
    }

    let met = entry
        .prerequisites
        .iter()
        .filter(|p| profile.has_initiative(p))
        .count();
    if met == entry.prerequisites.len() {
        confidence += 0.15;
    } else if met == 0 {
        confidence -= 0.2;
    }

    if profile.budget >= entry.cost_band() {
        confidence += 0.1;
    } else {
        confidence -= 0.15;
    }

    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initiative::Initiative;
    use crate::recommendations::profile::CompanySize;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn led_retrofit() -> CatalogEntry {
        CatalogEntry::new(Initiative::new("LED retrofit", 20_000.0, 50.0).with_category("Energy Efficiency"))
            .with_complexity(Band::Low)
            .with_timing(Pace::Short, Pace::Short)
            .with_impact(Band::Medium)
            .for_industry("Technology")
            .for_size(CompanySize::Small)
    }

    fn carbon_capture() -> CatalogEntry {
        CatalogEntry::new(Initiative::new("Carbon capture", 900_000.0, 5_000.0).with_category("Energy"))
            .with_complexity(Band::High)
            .with_timing(Pace::Long, Pace::Long)
            .with_impact(Band::High)
            .for_industry("Energy")
            .for_size(CompanySize::Large)
            .requires("Energy audit")
    }

    fn engine() -> RecommendationEngine {
        let mut engine = RecommendationEngine::new(RecommendationConfig::default()).unwrap();
        engine.load_catalog(vec![carbon_capture(), led_retrofit()]).unwrap();
        engine
    }

    fn starter() -> CompanyProfile {
        CompanyProfile::new("Technology", CompanySize::Small, 800.0, Band::Low)
    }

    fn advanced_emitter() -> CompanyProfile {
        CompanyProfile::new("Energy", CompanySize::Large, 50_000.0, Band::High)
            .with_initiative("Energy audit")
            .with_initiative("Fleet telematics")
            .with_practices(true, true, true)
    }

    #[rstest]
    #[case(starter(), Maturity::Starter, "LED retrofit")]
    #[case(advanced_emitter(), Maturity::Advanced, "Carbon capture")]
    fn test_ranking_follows_profile(
        #[case] profile: CompanyProfile,
        #[case] maturity: Maturity,
        #[case] expected_first: &str,
    ) {
        let report = engine().recommend(&profile, 10, true).unwrap();
        assert_eq!(report.profile_summary.maturity, maturity);
        assert_eq!(report.total_considered, 2);
        assert_eq!(report.recommendations[0].entry.name(), expected_first);
        assert!(report.recommendations[0].score > report.recommendations[1].score);
        for rec in &report.recommendations {
            assert!((0.0..=1.0).contains(&rec.content_score));
            assert!((0.0..=1.0).contains(&rec.rules_score));
        }
    }

    #[test]
    fn test_starter_scores() {
        let report = engine().recommend(&starter(), 10, true).unwrap();
        let led = &report.recommendations[0];
        assert_abs_diff_eq!(led.peer_score, 1.0);
        assert_abs_diff_eq!(led.rules_score, 1.0);
        assert!(led.content_score > 0.99);
        assert_abs_diff_eq!(led.confidence, 1.0);
        assert_eq!(
            led.rationale,
            vec![
                "Well-suited for Technology companies",
                "Perfect starting point for sustainability journey",
                "Cost-effective solution with good impact",
            ]
        );

        let capture = &report.recommendations[1];
        assert_abs_diff_eq!(capture.peer_score, 0.5);
        assert_abs_diff_eq!(capture.rules_score, 0.5);
        // unmet prerequisite and unaffordable
        assert_abs_diff_eq!(capture.confidence, 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_impact_and_payback() {
        let profile = CompanyProfile::new("Retail", CompanySize::Medium, 8_000.0, Band::Medium);
        let entry = CatalogEntry::new(Initiative::new("Heat pumps", 100_000.0, 400.0));
        let impact = engine().estimate_impact(&profile, &entry);
        assert_abs_diff_eq!(impact.estimated_co2_reduction, 400.0);
        assert_abs_diff_eq!(impact.reduction_percentage, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(impact.estimated_cost, 100_000.0);
        assert_abs_diff_eq!(impact.cost_per_tonne, 250.0);
        assert_abs_diff_eq!(impact.payback_years.unwrap(), 5.0, epsilon = 1e-9);

        let idle = CatalogEntry::new(Initiative::new("Signage", 5_000.0, 0.0));
        let impact = engine().estimate_impact(&profile, &idle);
        assert_eq!(impact.payback_years, None);
        assert_eq!(impact.cost_per_tonne, 0.0);
    }

    #[test]
    fn test_existing_initiatives_are_filtered() {
        let profile = starter().with_initiative("LED retrofit");
        let filtered = engine().recommend(&profile, 10, true).unwrap();
        assert_eq!(filtered.total_considered, 1);
        assert_eq!(filtered.recommendations[0].entry.name(), "Carbon capture");
        assert_eq!(filtered.filters_applied, vec!["existing_initiatives"]);

        let unfiltered = engine().recommend(&profile, 1, false).unwrap();
        assert_eq!(unfiltered.total_considered, 2);
        assert_eq!(unfiltered.recommendations.len(), 1);
        assert!(unfiltered.filters_applied.is_empty());
    }

    #[test]
    fn test_recommend_requires_catalog_and_limit() {
        let empty = RecommendationEngine::new(RecommendationConfig::default()).unwrap();
        assert!(matches!(
            empty.recommend(&starter(), 5, true),
            Err(OptimizerError::CatalogNotLoaded)
        ));
        assert!(matches!(
            engine().recommend(&starter(), 0, true),
            Err(OptimizerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let config = RecommendationConfig {
            content_weight: 0.7,
            ..RecommendationConfig::default()
        };
        assert!(matches!(
            RecommendationEngine::new(config),
            Err(OptimizerError::InvalidWeights(_))
        ));
        let config = RecommendationConfig {
            carbon_price: 0.0,
            ..RecommendationConfig::default()
        };
        assert!(matches!(
            RecommendationEngine::new(config),
            Err(OptimizerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_cosine_of_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_abs_diff_eq!(cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]), 1.0, epsilon = 1e-12);
    }
}
