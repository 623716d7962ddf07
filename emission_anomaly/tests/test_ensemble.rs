use chrono::{Duration, TimeZone, Utc};
use emission_anomaly::{
    AnomalyDetector, AnomalyEnsemble, AnomalyError, DataQualityReport, DetectionResult,
    EnsembleConfig, FeatureTable, QualityLevel,
};
use emission_core::{ObservationSeries, RawObservation, Scope};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn history_values(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + ((i * 37) % 17) as f64 * 0.5).collect()
}

fn daily(values: &[f64]) -> ObservationSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    ObservationSeries::from_daily_values(start, values).unwrap()
}

fn trained_ensemble(values: &[f64]) -> AnomalyEnsemble {
    let mut ensemble = AnomalyEnsemble::new(EnsembleConfig::default()).unwrap();
    ensemble.train_all(&daily(values)).unwrap();
    ensemble
}

#[rstest]
#[case(5.0)]
#[case(10.0)]
fn test_spike_is_flagged_by_statistical_detector(#[case] factor: f64) {
    let mut values = history_values(120);
    values[60] *= factor;
    let series = daily(&values);

    let mut ensemble = AnomalyEnsemble::new(EnsembleConfig::default()).unwrap();
    let training = ensemble.train_all(&series).unwrap();
    assert_eq!(
        training.methods_trained,
        vec!["isolation_forest", "statistical", "time_series"]
    );

    let report = ensemble.detect(&series).unwrap();
    let spike = report
        .anomalous_records
        .iter()
        .find(|r| r.index == 60)
        .expect("spike should be reported");
    assert!(spike.detected_by.contains(&"statistical".to_string()));
    assert_eq!(spike.value, values[60]);
}

#[test]
fn test_verdicts_match_contributing_methods() {
    let mut values = history_values(150);
    values[40] = 400.0;
    values[110] = 10.0;
    let ensemble = trained_ensemble(&values);
    let report = ensemble.detect(&daily(&values)).unwrap();

    assert_eq!(report.verdicts.len(), 150);
    for verdict in &report.verdicts {
        assert_eq!(verdict.flagged, !verdict.contributing_methods.is_empty());
        assert!((0.0..=1.0).contains(&verdict.score));
    }
    let flagged = report.verdicts.iter().filter(|v| v.flagged).count();
    assert_eq!(flagged, report.total_anomalies);
    assert_eq!(report.anomalous_records.len(), report.total_anomalies);
    assert!((report.anomaly_rate - flagged as f64 / 150.0).abs() < 1e-12);
}

#[test]
fn test_detection_uses_training_thresholds() {
    let ensemble = trained_ensemble(&history_values(120));

    // The shifted batch is internally consistent, so only fitted statistics can flag it
    let shifted: Vec<f64> = history_values(60).iter().map(|v| v + 1_000.0).collect();
    let report = ensemble.detect(&daily(&shifted)).unwrap();

    assert_eq!(report.detections_by_method["statistical"], 60);
    assert_eq!(report.total_anomalies, 60);
}

#[test]
fn test_healthy_follow_up_batch_keeps_training_context() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let values: Vec<f64> = (0..130).map(|i| 100.0 + (i % 3) as f64).collect();
    let mut ensemble = AnomalyEnsemble::new(EnsembleConfig::default()).unwrap();
    ensemble
        .train_all(&ObservationSeries::from_daily_values(start, &values[..120]).unwrap())
        .unwrap();

    let batch =
        ObservationSeries::from_daily_values(start + Duration::days(120), &values[120..]).unwrap();
    let report = ensemble.detect(&batch).unwrap();

    assert_eq!(report.verdicts.len(), 10);
    assert_eq!(report.detections_by_method["statistical"], 0);
    assert_eq!(report.detections_by_method["time_series"], 0);
    // Only the density detector's contamination share can remain
    for record in &report.anomalous_records {
        assert_eq!(record.detected_by, vec!["isolation_forest".to_string()]);
    }
}

#[test]
fn test_seeded_ensembles_agree() {
    let values = history_values(200);
    let first = trained_ensemble(&values).detect(&daily(&values)).unwrap();
    let second = trained_ensemble(&values).detect(&daily(&values)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_detect_before_training() {
    let ensemble = AnomalyEnsemble::new(EnsembleConfig::default()).unwrap();
    assert!(matches!(
        ensemble.detect(&daily(&[1.0, 2.0])),
        Err(AnomalyError::NotTrained)
    ));
}

#[test]
fn test_single_record_fails_every_detector() {
    let mut ensemble = AnomalyEnsemble::new(EnsembleConfig::default()).unwrap();
    let err = ensemble.train_all(&daily(&[5.0])).unwrap_err();
    assert!(matches!(err, AnomalyError::AllDetectorsFailed(_)));
    assert!(!ensemble.is_trained());
}

#[test]
fn test_records_keep_their_tags() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut raw: Vec<RawObservation> = history_values(90)
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            RawObservation::new(start + Duration::days(i as i64), Some(v))
                .with_scope(Scope::Scope2)
                .with_activity("electricity")
                .with_company(7)
        })
        .collect();
    raw[45].value = Some(2_000.0);
    let series = ObservationSeries::new(raw).unwrap();

    let mut ensemble = AnomalyEnsemble::new(EnsembleConfig::default()).unwrap();
    ensemble.train_all(&series).unwrap();
    let report = ensemble.detect(&series).unwrap();

    let record = report
        .anomalous_records
        .iter()
        .find(|r| r.index == 45)
        .expect("tagged spike should be reported");
    assert_eq!(record.scope, Some(Scope::Scope2));
    assert_eq!(record.activity_type.as_deref(), Some("electricity"));
    assert_eq!(record.company_id, Some(7));
}

/// Flags every record whose value exceeds a fixed limit
struct LimitDetector {
    limit: f64,
    fitted: bool,
}

impl AnomalyDetector for LimitDetector {
    fn name(&self) -> &str {
        "limit"
    }

    fn fit(&mut self, _table: &FeatureTable) -> emission_anomaly::Result<()> {
        self.fitted = true;
        Ok(())
    }

    fn detect(&self, table: &FeatureTable) -> emission_anomaly::Result<DetectionResult> {
        let flags = table.values().iter().map(|&v| v > self.limit).collect();
        let scores = table.values().to_vec();
        Ok(DetectionResult::new(flags, scores, self.limit))
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

#[test]
fn test_registered_detector_joins_the_union() {
    let values = history_values(120);
    let mut ensemble = AnomalyEnsemble::new(EnsembleConfig::default()).unwrap();
    ensemble.register(Box::new(LimitDetector {
        limit: 107.0,
        fitted: false,
    }));
    ensemble.train_all(&daily(&values)).unwrap();

    let report = ensemble.detect(&daily(&values)).unwrap();
    let expected = values.iter().filter(|&&v| v > 107.0).count();
    assert_eq!(report.detections_by_method["limit"], expected);
    assert_eq!(report.detection_methods.last().map(String::as_str), Some("limit"));
    for verdict in report.verdicts.iter().filter(|v| v.value > 107.0) {
        assert!(verdict.contributing_methods.contains(&"limit".to_string()));
    }
}

#[test]
fn test_quality_of_shifted_batch() {
    let ensemble = trained_ensemble(&history_values(120));
    let batch: Vec<f64> = history_values(60).iter().map(|v| v + 1_000.0).collect();

    let report = ensemble.detect(&daily(&batch)).unwrap();
    let quality = DataQualityReport::from_detection(&report);
    assert_eq!(quality.data_quality_score, 0.0);
    assert_eq!(quality.quality_level, QualityLevel::Poor);
    assert_eq!(quality.issues_found[0], "High anomaly rate detected: 100.0%");
    assert!(quality
        .issues_found
        .contains(&"statistical detected 60 anomalies".to_string()));
}

#[test]
fn test_report_serializes_for_callers() {
    let mut values = history_values(90);
    values[45] = 600.0;
    let ensemble = trained_ensemble(&values);
    let report = ensemble.detect(&daily(&values)).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["total_anomalies"], report.total_anomalies);
    assert_eq!(
        json["verdicts"].as_array().map(|v| v.len()),
        Some(report.verdicts.len())
    );

    let config: EnsembleConfig =
        serde_json::from_str(&serde_json::to_string(&EnsembleConfig::default()).unwrap()).unwrap();
    assert_eq!(config, EnsembleConfig::default());
}
