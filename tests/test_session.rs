use carbon_insight::{
    AnalyticsSession, EmissionsProfile, EngineConfig, Initiative, InsightError, ObservationSeries,
    TargetStrategy,
};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::io::Write;

fn seasonal_series(days: usize) -> ObservationSeries {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let values: Vec<f64> = (0..days)
        .map(|i| 200.0 + 12.0 * ((i % 7) as f64 - 3.0) + ((i * 13) % 5) as f64)
        .collect();
    ObservationSeries::from_daily_values(start, &values).unwrap()
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"forecaster": {{"test_ratio": 0.25}}, "scenario": {{"uncertainty": {{"mode": "seeded", "seed": 3}}}}}}"#
    )
    .unwrap();

    let config = EngineConfig::from_path(file.path()).unwrap();
    assert_eq!(config.forecaster.test_ratio, 0.25);
    assert_eq!(
        config.scenario.uncertainty,
        carbon_insight::scenario_projector::UncertaintyMode::Seeded { seed: 3 }
    );
}

#[test]
fn test_config_json_round_trip() {
    let config = EngineConfig::default();
    let json = config.to_json_pretty().unwrap();
    assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::from_path(dir.path().join("absent.json"));
    assert!(matches!(result, Err(InsightError::Io(_))));
}

#[test]
fn test_analyze_series() {
    let mut session = AnalyticsSession::new(EngineConfig::default()).unwrap();
    let analysis = session.analyze_series(&seasonal_series(120), 14).unwrap();

    assert_eq!(analysis.forecast.predictions.len(), 14);
    assert_eq!(analysis.anomalies.verdicts.len(), 120);
    assert!(!analysis.detectors.methods_trained.is_empty());
    assert!((0.0..=100.0).contains(&analysis.quality.data_quality_score));
    assert!(session.forecaster().is_trained());
    assert!(session.anomaly().is_trained());
}

#[test]
fn test_session_engines_are_independent() {
    let mut session = AnalyticsSession::new(EngineConfig::default()).unwrap();

    session
        .optimizer_mut()
        .define_problem(
            vec![
                Initiative::new("LED retrofit", 50_000.0, 100.0),
                Initiative::new("Solar array", 200_000.0, 500.0),
            ],
            300_000.0,
            400.0,
        )
        .unwrap();
    let report = session.optimizer().run_all().unwrap();
    assert!(report.optimization_results.iter().any(|r| r.success));

    session
        .projector_mut()
        .create_baseline(EmissionsProfile::new(10_000.0).with_epoch_year(2025))
        .unwrap();
    let scenario = session
        .projector_mut()
        .create_target_scenario(0.3, 2030, TargetStrategy::HighImpact)
        .unwrap();
    assert!(scenario.feasibility_analysis.is_some());

    let fresh = AnalyticsSession::new(session.config().clone()).unwrap();
    assert!(fresh.optimizer().problem().is_none());
    assert!(fresh.projector().baseline().is_none());
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = EngineConfig::default();
    config.optimizer.recombination = 1.5;
    assert!(matches!(
        AnalyticsSession::new(config),
        Err(InsightError::Optimizer(_))
    ));
}

#[test]
fn test_init_tracing_is_idempotent() {
    carbon_insight::init_tracing();
    carbon_insight::init_tracing();
}

#[test]
fn test_engines_can_move_between_threads() {
    fn assert_send<T: Send>() {}
    assert_send::<carbon_insight::Forecaster>();
    assert_send::<carbon_insight::AnomalyEnsemble>();
    assert_send::<carbon_insight::ReductionOptimizer>();
    assert_send::<carbon_insight::ScenarioProjector>();
    assert_send::<AnalyticsSession>();
}
