//! Ensemble of anomaly detectors
//!
//! The ensemble owns a registry of detectors. Training fits each one on the same
//! feature table and keeps those that succeed; detection scores new records with the
//! fitted state only and takes the union of the binary calls.

use crate::config::EnsembleConfig;
use crate::detectors::{
    AnomalyDetector, DensityDetector, DetectionResult, StatisticalDetector, TemporalDetector,
};
use crate::features::{
    prepare_features, prepare_features_with_context, FeatureContext, FeatureTable,
};
use crate::{AnomalyError, Result};
use chrono::{DateTime, Utc};
use emission_core::{stats, ObservationSeries, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Training outcome of one detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorOutcome {
    pub name: String,
    pub success: bool,
    /// Number of training records the fitted detector flags
    pub num_anomalies: Option<usize>,
    pub anomaly_rate: Option<f64>,
    pub error: Option<String>,
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleTrainingReport {
    pub records: usize,
    pub methods_trained: Vec<String>,
    /// Every registered detector in registry order
    pub detectors: Vec<DetectorOutcome>,
    pub anomaly_rates: BTreeMap<String, f64>,
    pub average_anomaly_rate: f64,
    pub max_anomaly_rate: f64,
    pub min_anomaly_rate: f64,
}

/// Ensemble decision for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub flagged: bool,
    /// Detectors that flagged the record, in registry order
    pub contributing_methods: Vec<String>,
    /// Share of applied detectors that flagged the record
    pub score: f64,
}

/// A flagged record with its identifying fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalousRecord {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub scope: Option<Scope>,
    pub activity_type: Option<String>,
    pub company_id: Option<u64>,
    pub detected_by: Vec<String>,
    pub score: f64,
}

/// Outcome of scoring new records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalous_records: Vec<AnomalousRecord>,
    pub verdicts: Vec<AnomalyVerdict>,
    pub total_anomalies: usize,
    pub anomaly_rate: f64,
    pub detections_by_method: BTreeMap<String, usize>,
    /// Detectors applied to the records, in registry order
    pub detection_methods: Vec<String>,
}

/// Registry of anomaly detectors with their fitted state
pub struct AnomalyEnsemble {
    config: EnsembleConfig,
    detectors: Vec<Box<dyn AnomalyDetector>>,
    /// Whether each detector trained in the latest run
    trained: Vec<bool>,
    /// Training values and column means for deriving batch features
    context: Option<FeatureContext>,
}

impl AnomalyEnsemble {
    /// Create a new ensemble with the density, statistical and temporal detectors
    pub fn new(config: EnsembleConfig) -> Result<Self> {
        config.validate()?;
        let detectors: Vec<Box<dyn AnomalyDetector>> = vec![
            Box::new(DensityDetector::from_config(&config)?),
            Box::new(StatisticalDetector::from_config(&config)?),
            Box::new(TemporalDetector::from_config(&config)?),
        ];
        let trained = vec![false; detectors.len()];
        Ok(Self {
            config,
            detectors,
            trained,
            context: None,
        })
    }

    /// Append a detector to the registry; it takes part from the next training run
    pub fn register(&mut self, detector: Box<dyn AnomalyDetector>) {
        self.detectors.push(detector);
        self.trained.push(false);
    }

    /// Names of the registered detectors
    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.trained.iter().any(|&t| t)
    }

    /// Fit every detector on the history, skipping those that fail
    pub fn train_all(&mut self, series: &ObservationSeries) -> Result<EnsembleTrainingReport> {
        let table = prepare_features(series)?;
        info!(records = table.len(), detectors = self.detectors.len(), "Training anomaly detectors");
        self.context = Some(FeatureContext::from_table(&table)?);

        let mut outcomes = Vec::with_capacity(self.detectors.len());
        for (detector, trained) in self.detectors.iter_mut().zip(self.trained.iter_mut()) {
            let name = detector.name().to_string();
            let outcome = detector.fit(&table).and_then(|_| detector.detect(&table));
            match outcome {
                Ok(result) => {
                    *trained = true;
                    debug!(detector = %name, anomalies = result.anomaly_count(), "Detector trained");
                    outcomes.push(DetectorOutcome {
                        name,
                        success: true,
                        num_anomalies: Some(result.anomaly_count()),
                        anomaly_rate: Some(result.anomaly_rate()),
                        error: None,
                    });
                }
                Err(err) => {
                    *trained = false;
                    warn!(detector = %name, records = table.len(), error = %err, "Detector failed to train");
                    outcomes.push(DetectorOutcome {
                        name,
                        success: false,
                        num_anomalies: None,
                        anomaly_rate: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        let anomaly_rates: BTreeMap<String, f64> = outcomes
            .iter()
            .filter_map(|o| o.anomaly_rate.map(|rate| (o.name.clone(), rate)))
            .collect();
        if anomaly_rates.is_empty() {
            let reasons: Vec<String> = outcomes
                .iter()
                .map(|o| format!("{}: {}", o.name, o.error.as_deref().unwrap_or("unknown")))
                .collect();
            return Err(AnomalyError::AllDetectorsFailed(reasons.join("; ")));
        }

        let rates: Vec<f64> = anomaly_rates.values().copied().collect();
        let report = EnsembleTrainingReport {
            records: table.len(),
            methods_trained: outcomes
                .iter()
                .filter(|o| o.success)
                .map(|o| o.name.clone())
                .collect(),
            average_anomaly_rate: stats::mean(&rates),
            max_anomaly_rate: rates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_anomaly_rate: rates.iter().copied().fold(f64::INFINITY, f64::min),
            anomaly_rates,
            detectors: outcomes,
        };

        info!(
            methods = report.methods_trained.len(),
            average_anomaly_rate = report.average_anomaly_rate,
            "Anomaly detectors trained"
        );
        Ok(report)
    }

    /// Score new records with the fitted detectors
    ///
    /// A batch starting after the training data continues its rolling windows from the
    /// training tail; incomplete windows take the training column means.
    pub fn detect(&self, new_data: &ObservationSeries) -> Result<AnomalyReport> {
        if !self.is_trained() {
            return Err(AnomalyError::NotTrained);
        }

        let table = match &self.context {
            Some(context) => prepare_features_with_context(new_data, context)?,
            None => prepare_features(new_data)?,
        };
        let mut applied: Vec<(String, DetectionResult)> = Vec::new();
        for (detector, _) in self
            .detectors
            .iter()
            .zip(&self.trained)
            .filter(|(_, trained)| **trained)
        {
            match detector.detect(&table) {
                Ok(result) if result.is_anomaly.len() == table.len() => {
                    applied.push((detector.name().to_string(), result));
                }
                Ok(result) => {
                    warn!(
                        detector = detector.name(),
                        expected = table.len(),
                        returned = result.is_anomaly.len(),
                        "Detector returned a mismatched result"
                    );
                }
                Err(err) => {
                    warn!(detector = detector.name(), error = %err, "Detector failed on new data");
                }
            }
        }

        if applied.is_empty() {
            return Err(AnomalyError::AllDetectorsFailed(
                "no fitted detector could score the records".to_string(),
            ));
        }

        let report = combine(&table, &applied);
        info!(
            records = table.len(),
            anomalies = report.total_anomalies,
            anomaly_rate = report.anomaly_rate,
            "Anomaly detection complete"
        );
        Ok(report)
    }
}

/// Union of the per-detector calls
fn combine(table: &FeatureTable, applied: &[(String, DetectionResult)]) -> AnomalyReport {
    let verdicts: Vec<AnomalyVerdict> = (0..table.len())
        .map(|index| {
            let contributing_methods: Vec<String> = applied
                .iter()
                .filter(|(_, result)| result.is_anomaly[index])
                .map(|(name, _)| name.clone())
                .collect();
            AnomalyVerdict {
                index,
                timestamp: table.timestamps()[index],
                value: table.values()[index],
                flagged: !contributing_methods.is_empty(),
                score: stats::safe_ratio(contributing_methods.len() as f64, applied.len() as f64),
                contributing_methods,
            }
        })
        .collect();

    let anomalous_records: Vec<AnomalousRecord> = verdicts
        .iter()
        .filter(|v| v.flagged)
        .map(|v| AnomalousRecord {
            index: v.index,
            timestamp: v.timestamp,
            value: v.value,
            scope: table.scope(v.index),
            activity_type: table.activity_type(v.index).map(str::to_string),
            company_id: table.company_id(v.index),
            detected_by: v.contributing_methods.clone(),
            score: v.score,
        })
        .collect();

    let total_anomalies = anomalous_records.len();
    AnomalyReport {
        anomaly_rate: stats::safe_ratio(total_anomalies as f64, table.len() as f64),
        detections_by_method: applied
            .iter()
            .map(|(name, result)| (name.clone(), result.anomaly_count()))
            .collect(),
        detection_methods: applied.iter().map(|(name, _)| name.clone()).collect(),
        total_anomalies,
        anomalous_records,
        verdicts,
    }
}

impl std::fmt::Debug for AnomalyEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyEnsemble")
            .field("config", &self.config)
            .field("detectors", &self.detector_names())
            .field("trained", &self.trained)
            .finish()
    }
}
