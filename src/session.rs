//! One set of engines sharing a configuration

use crate::config::EngineConfig;
use crate::Result;
use emission_anomaly::{AnomalyEnsemble, AnomalyReport, DataQualityReport, EnsembleTrainingReport};
use emission_core::ObservationSeries;
use emission_forecast::{ForecastResult, Forecaster, TrainingSummary};
use reduction_optimizer::ReductionOptimizer;
use scenario_projector::ScenarioProjector;
use serde::Serialize;
use tracing::info;

/// Forecast and anomaly results for one observation series
#[derive(Debug, Clone, Serialize)]
pub struct SeriesAnalysis {
    pub training: TrainingSummary,
    pub forecast: ForecastResult,
    pub detectors: EnsembleTrainingReport,
    pub anomalies: AnomalyReport,
    pub quality: DataQualityReport,
}

/// Fresh engine instances built from one [`EngineConfig`]
///
/// Engines own their fitted state, so each session starts untrained and nothing is
/// shared between sessions.
#[derive(Debug)]
pub struct AnalyticsSession {
    config: EngineConfig,
    forecaster: Forecaster,
    anomaly: AnomalyEnsemble,
    optimizer: ReductionOptimizer,
    projector: ScenarioProjector,
}

impl AnalyticsSession {
    /// Validate the configuration and build every engine
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            forecaster: Forecaster::new(config.forecaster.clone()),
            anomaly: AnomalyEnsemble::new(config.anomaly.clone())?,
            optimizer: ReductionOptimizer::new(config.optimizer.clone())?,
            projector: ScenarioProjector::new(config.scenario.clone())?,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn forecaster(&self) -> &Forecaster {
        &self.forecaster
    }

    pub fn forecaster_mut(&mut self) -> &mut Forecaster {
        &mut self.forecaster
    }

    pub fn anomaly(&self) -> &AnomalyEnsemble {
        &self.anomaly
    }

    pub fn anomaly_mut(&mut self) -> &mut AnomalyEnsemble {
        &mut self.anomaly
    }

    pub fn optimizer(&self) -> &ReductionOptimizer {
        &self.optimizer
    }

    pub fn optimizer_mut(&mut self) -> &mut ReductionOptimizer {
        &mut self.optimizer
    }

    pub fn projector(&self) -> &ScenarioProjector {
        &self.projector
    }

    pub fn projector_mut(&mut self) -> &mut ScenarioProjector {
        &mut self.projector
    }

    /// Train the forecaster and anomaly ensemble on `series`, forecast `horizon` days
    /// and screen the same series for anomalies
    pub fn analyze_series(&mut self, series: &ObservationSeries, horizon: usize) -> Result<SeriesAnalysis> {
        let training = self.forecaster.train(series)?;
        let forecast = self.forecaster.predict(horizon)?;

        let detectors = self.anomaly.train_all(series)?;
        let anomalies = self.anomaly.detect(series)?;
        let quality = DataQualityReport::from_detection(&anomalies);

        info!(
            model = %training.model_used,
            horizon,
            anomalies = anomalies.total_anomalies,
            quality_score = quality.data_quality_score,
            "Series analysis complete"
        );
        Ok(SeriesAnalysis {
            training,
            forecast,
            detectors,
            anomalies,
            quality,
        })
    }
}
