use chrono::{Duration, TimeZone, Utc};
use emission_anomaly::{AnomalyEnsemble, DataQualityReport, EnsembleConfig};
use emission_core::ObservationSeries;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Emission Anomaly: Ensemble Detection Example");
    println!("============================================\n");

    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .ok_or("invalid start date")?;

    // Four months of steady daily emissions
    let history: Vec<f64> = (0..120).map(|day| 250.0 + (day % 5) as f64 * 2.0).collect();
    let training = ObservationSeries::from_daily_values(start, &history)?;

    println!("Training detectors on {} days...", training.len());
    let mut ensemble = AnomalyEnsemble::new(EnsembleConfig::default())?;
    let training_report = ensemble.train_all(&training)?;
    println!("{:#?}\n", training_report);

    // The following ten days, with a metering fault on day five
    let mut batch: Vec<f64> = (120..130).map(|day| 250.0 + (day % 5) as f64 * 2.0).collect();
    batch[4] = 1_400.0;
    let follow_up = ObservationSeries::from_daily_values(start + Duration::days(120), &batch)?;

    let report = ensemble.detect(&follow_up)?;
    println!(
        "{} of {} records flagged ({:.1}%)",
        report.total_anomalies,
        follow_up.len(),
        report.anomaly_rate * 100.0
    );
    for record in &report.anomalous_records {
        println!(
            "  {} value {:.1} score {:.2} detected by {:?}",
            record.timestamp.date_naive(),
            record.value,
            record.score,
            record.detected_by
        );
    }

    let quality = DataQualityReport::from_detection(&report);
    println!(
        "\nData quality: {:.1} ({:?})",
        quality.data_quality_score, quality.quality_level
    );
    for recommendation in &quality.recommendations {
        println!("  - {}", recommendation);
    }

    Ok(())
}
