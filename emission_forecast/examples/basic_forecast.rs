use chrono::{TimeZone, Utc};
use emission_core::ObservationSeries;
use emission_forecast::{Forecaster, ForecasterConfig, TrendAnalyzer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Emission Forecast: Basic Forecasting Example");
    println!("============================================\n");

    // A year of daily emissions with a weekly cycle and a slow upward drift
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .ok_or("invalid start date")?;
    let values: Vec<f64> = (0..365)
        .map(|day| {
            let weekly = [4.0, 6.0, 7.0, 6.5, 5.0, -12.0, -16.5][day % 7];
            120.0 + 0.05 * day as f64 + weekly
        })
        .collect();
    let series = ObservationSeries::from_daily_values(start, &values)?;
    println!("Sample data created: {} daily observations\n", series.len());

    let trend = TrendAnalyzer::new().analyze(&series)?;
    println!("Trend analysis:");
    println!(
        "  slope {:.4}/day, {:?}, r² {:.3}, significant: {}",
        trend.trend_analysis.slope,
        trend.trend_analysis.trend_direction,
        trend.trend_analysis.r_squared,
        trend.trend_analysis.is_significant
    );
    println!(
        "  peak month {}, low month {}, {} change points\n",
        trend.seasonality.peak_month, trend.seasonality.low_month, trend.change_points.num_change_points
    );

    println!("Training candidate models...");
    let mut forecaster = Forecaster::new(ForecasterConfig::default());
    let summary = forecaster.train(&series)?;
    println!(
        "Selected {} (period {}, {} train / {} test points)",
        summary.model_used, summary.seasonal_period, summary.train_size, summary.test_size
    );
    for candidate in &summary.candidates {
        println!("  {:?}", candidate);
    }

    let forecast = forecaster.predict(14)?;
    println!("\n14-day forecast with 95% interval:");
    for (i, date) in forecast.dates.iter().enumerate() {
        println!(
            "  {}: {:.2} ({:.2}, {:.2})",
            date,
            forecast.predictions[i],
            forecast.confidence_interval.lower[i],
            forecast.confidence_interval.upper[i]
        );
    }

    println!("\nFitted state can be persisted and restored:");
    let state = forecaster.export_state()?;
    let restored = Forecaster::from_state(ForecasterConfig::default(), &state)?;
    println!("  restored model trained: {}", restored.is_trained());

    Ok(())
}
