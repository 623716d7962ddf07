use pretty_assertions::assert_eq;
use reduction_optimizer::recommendations::{Band, CatalogEntry, CompanySize, Maturity};
use reduction_optimizer::{CompanyProfile, RecommendationConfig, RecommendationEngine};
use rstest::rstest;

const CATALOG: &str = r#"[
    {
        "initiative": {"name": "LED retrofit", "cost": 20000.0, "co2_reduction": 50.0, "category": "Energy Efficiency"},
        "implementation_time": "Short",
        "complexity": "Low",
        "roi_timeframe": "Short",
        "industries": ["Technology", "Manufacturing"],
        "company_sizes": ["Small", "Medium"]
    },
    {
        "initiative": {"name": "Rooftop solar", "cost": 150000.0, "co2_reduction": 400.0, "category": "Renewable Energy"},
        "impact": "High",
        "industries": ["Manufacturing"],
        "company_sizes": ["Medium", "Large"],
        "prerequisites": ["Energy audit"]
    },
    {
        "initiative": {"name": "Carbon capture", "cost": 900000.0, "co2_reduction": 5000.0, "category": "Energy"},
        "implementation_time": "Long",
        "complexity": "High",
        "roi_timeframe": "Long",
        "impact": "High",
        "industries": ["Energy"],
        "company_sizes": ["Large"]
    }
]"#;

fn engine() -> RecommendationEngine {
    let entries: Vec<CatalogEntry> = serde_json::from_str(CATALOG).unwrap();
    let mut engine = RecommendationEngine::new(RecommendationConfig::default()).unwrap();
    engine.load_catalog(entries).unwrap();
    engine
}

fn manufacturer() -> CompanyProfile {
    CompanyProfile::new("Manufacturing", CompanySize::Medium, 12_000.0, Band::Medium)
}

#[test]
fn test_catalog_loads_from_json() {
    let entries: Vec<CatalogEntry> = serde_json::from_str(CATALOG).unwrap();
    let mut engine = RecommendationEngine::new(RecommendationConfig::default()).unwrap();
    let summary = engine.load_catalog(entries).unwrap();

    assert_eq!(summary.total_initiatives, 3);
    assert_eq!(summary.categories, vec!["Energy", "Energy Efficiency", "Renewable Energy"]);
    assert_eq!(summary.cost_bands, vec![Band::Low, Band::Medium, Band::High]);
    assert_eq!(engine.catalog()[1].complexity, Band::Medium);
}

#[rstest]
#[case(1, 1)]
#[case(2, 2)]
#[case(5, 3)]
fn test_recommendations_are_ranked_and_bounded(#[case] limit: usize, #[case] expected: usize) {
    let report = engine().recommend(&manufacturer(), limit, true).unwrap();

    assert_eq!(report.total_considered, 3);
    assert_eq!(report.recommendations.len(), expected);
    for pair in report.recommendations.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for rec in &report.recommendations {
        assert!((0.0..=1.0).contains(&rec.confidence));
        assert!(!rec.rationale.is_empty() && rec.rationale.len() <= 3);
        assert_eq!(rec.roadmap.phases.len(), 3);
    }
}

#[test]
fn test_growing_practice_changes_maturity() {
    let engine = engine();
    let starter = engine.recommend(&manufacturer(), 3, true).unwrap();
    assert_eq!(starter.profile_summary.maturity, Maturity::Starter);

    let practised = manufacturer()
        .with_initiative("Energy audit")
        .with_practices(true, true, false);
    let report = engine.recommend(&practised, 3, true).unwrap();
    assert_eq!(report.profile_summary.maturity, Maturity::Intermediate);
    assert_eq!(report.profile_summary.current_initiatives_count, 1);

    let solar = report
        .recommendations
        .iter()
        .find(|r| r.entry.name() == "Rooftop solar")
        .unwrap();
    let solar_before = starter
        .recommendations
        .iter()
        .find(|r| r.entry.name() == "Rooftop solar")
        .unwrap();
    // the audit prerequisite is now in place
    assert!(solar.confidence > solar_before.confidence);
}

#[test]
fn test_report_serializes_for_callers() {
    let report = engine().recommend(&manufacturer(), 2, true).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["profile_summary"]["maturity"], "Starter");
    assert_eq!(json["filters_applied"][0], "existing_initiatives");
    assert_eq!(json["recommendations"].as_array().unwrap().len(), 2);
    assert!(json["recommendations"][0]["estimated_impact"]["payback_years"].is_number());
}
