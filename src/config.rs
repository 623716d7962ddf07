//! Combined engine configuration

use crate::Result;
use emission_anomaly::EnsembleConfig;
use emission_forecast::ForecasterConfig;
use reduction_optimizer::OptimizerConfig;
use scenario_projector::ScenarioConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration of every engine; missing sections take their defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub forecaster: ForecasterConfig,
    pub anomaly: EnsembleConfig,
    pub optimizer: OptimizerConfig,
    pub scenario: ScenarioConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.forecaster.validate()?;
        self.anomaly.validate()?;
        self.optimizer.validate()?;
        self.scenario.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InsightError;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"optimizer": {"seed": 7}, "scenario": {"carbon_price": 80.0}}"#,
        )
        .unwrap();
        assert_eq!(config.optimizer.seed, 7);
        assert_eq!(config.optimizer.generations, OptimizerConfig::default().generations);
        assert_eq!(config.scenario.carbon_price, 80.0);
        assert_eq!(config.anomaly, EnsembleConfig::default());
    }

    #[test]
    fn test_invalid_section_rejected() {
        let result = EngineConfig::from_json_str(r#"{"anomaly": {"contamination": 0.9}}"#);
        assert!(matches!(result, Err(InsightError::Anomaly(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(InsightError::Config(_))
        ));
    }
}
