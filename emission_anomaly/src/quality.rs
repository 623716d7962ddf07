//! Data-quality scoring from an anomaly report

use crate::ensemble::AnomalyReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anomaly rate above which the data collection itself is suspect
const HIGH_ANOMALY_RATE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLevel {
    /// Band a 0-100 quality score
    pub fn from_score(score: f64) -> Self {
        if score >= 95.0 {
            QualityLevel::Excellent
        } else if score >= 85.0 {
            QualityLevel::Good
        } else if score >= 70.0 {
            QualityLevel::Fair
        } else {
            QualityLevel::Poor
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityLevel::Excellent => write!(f, "Excellent"),
            QualityLevel::Good => write!(f, "Good"),
            QualityLevel::Fair => write!(f, "Fair"),
            QualityLevel::Poor => write!(f, "Poor"),
        }
    }
}

/// Quality score, issues and recommendations for a batch of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub data_quality_score: f64,
    pub quality_level: QualityLevel,
    pub issues_found: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DataQualityReport {
    /// Derive the quality report from a detection outcome
    pub fn from_detection(report: &AnomalyReport) -> Self {
        let rate = report.anomaly_rate;
        let data_quality_score = (100.0 * (1.0 - rate)).clamp(0.0, 100.0);

        let mut issues_found = Vec::new();
        let mut recommendations = Vec::new();

        if rate > HIGH_ANOMALY_RATE {
            issues_found.push(format!("High anomaly rate detected: {:.1}%", rate * 100.0));
            recommendations.push(
                "Review data collection processes and validate anomalous records".to_string(),
            );
        }

        if report.total_anomalies > 0 {
            for method in &report.detection_methods {
                let count = report.detections_by_method.get(method).copied().unwrap_or(0);
                if count > 0 {
                    issues_found.push(format!("{} detected {} anomalies", method, count));
                }
            }
        }

        if recommendations.is_empty() {
            if data_quality_score >= 95.0 {
                recommendations.push("Data quality is excellent. Continue current practices.".to_string());
            } else {
                recommendations.extend(
                    [
                        "Implement automated data validation checks",
                        "Set up real-time anomaly monitoring",
                        "Review and validate flagged records",
                    ]
                    .map(String::from),
                );
            }
        }

        Self {
            data_quality_score,
            quality_level: QualityLevel::from_score(data_quality_score),
            issues_found,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn report(total: usize, records: usize, by_method: &[(&str, usize)]) -> AnomalyReport {
        AnomalyReport {
            anomalous_records: Vec::new(),
            verdicts: Vec::new(),
            total_anomalies: total,
            anomaly_rate: total as f64 / records as f64,
            detections_by_method: by_method
                .iter()
                .map(|(name, count)| (name.to_string(), *count))
                .collect::<BTreeMap<_, _>>(),
            detection_methods: by_method.iter().map(|(name, _)| name.to_string()).collect(),
        }
    }

    #[test]
    fn test_clean_batch_is_excellent() {
        let quality = DataQualityReport::from_detection(&report(0, 100, &[("statistical", 0)]));
        assert_eq!(quality.quality_level, QualityLevel::Excellent);
        assert!(quality.issues_found.is_empty());
        assert_eq!(
            quality.recommendations,
            vec!["Data quality is excellent. Continue current practices.".to_string()]
        );
    }

    #[test]
    fn test_high_rate_batch() {
        let quality = DataQualityReport::from_detection(&report(
            25,
            100,
            &[("isolation_forest", 10), ("statistical", 20), ("time_series", 0)],
        ));
        assert_eq!(quality.data_quality_score, 75.0);
        assert_eq!(quality.quality_level, QualityLevel::Fair);
        assert_eq!(
            quality.issues_found,
            vec![
                "High anomaly rate detected: 25.0%".to_string(),
                "isolation_forest detected 10 anomalies".to_string(),
                "statistical detected 20 anomalies".to_string(),
            ]
        );
        assert_eq!(quality.recommendations.len(), 1);
    }

    #[test]
    fn test_moderate_rate_gets_generic_recommendations() {
        let quality = DataQualityReport::from_detection(&report(8, 100, &[("statistical", 8)]));
        assert_eq!(quality.quality_level, QualityLevel::Good);
        assert_eq!(quality.recommendations.len(), 3);
    }
}
