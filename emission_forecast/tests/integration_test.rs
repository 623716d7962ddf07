use chrono::{Duration, NaiveDate, TimeZone, Utc};
use emission_core::ObservationSeries;
use emission_forecast::{ForecastError, Forecaster, ForecasterConfig, TrainedForecastModel};
use std::io::Write;
use tempfile::NamedTempFile;

// Helper function to write a daily emissions CSV with trend and weekly cycle
fn create_sample_data(days: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    writeln!(file, "date,emissions,scope").unwrap();
    for i in 0..days {
        let date = start + Duration::days(i as i64);
        let weekly = if i % 7 >= 5 { -15.0 } else { 5.0 };
        let wobble = ((i * 37) % 11) as f64 * 0.5;
        writeln!(file, "{},{:.3},SCOPE_1", date, 500.0 + 0.8 * i as f64 + weekly + wobble).unwrap();
    }

    file
}

#[test]
fn test_full_forecast_workflow() {
    // 1. Load data
    let data_file = create_sample_data(150);
    let series = ObservationSeries::from_csv_path(data_file.path()).unwrap();
    assert_eq!(series.len(), 150);

    // 2. Train every candidate and select the best
    let mut forecaster = Forecaster::new(ForecasterConfig::default());
    let summary = forecaster.train(&series).unwrap();

    assert_eq!(summary.seasonal_period, 7);
    assert_eq!(summary.train_size, 120);
    assert_eq!(summary.test_size, 30);
    assert_eq!(summary.candidates.len(), 3);
    assert!(summary
        .candidates
        .iter()
        .any(|c| c.success && c.name == summary.model_used));

    // The winner has the lowest hold-out MAE
    let best_mae = summary
        .candidates
        .iter()
        .filter_map(|c| c.accuracy.map(|a| a.mae))
        .fold(f64::INFINITY, f64::min);
    let winner = summary
        .candidates
        .iter()
        .find(|c| c.name == summary.model_used)
        .and_then(|c| c.accuracy)
        .unwrap();
    assert_eq!(winner.mae, best_mae);

    // 3. Forecast two weeks ahead
    let forecast = forecaster.predict(14).unwrap();
    assert_eq!(forecast.horizons(), 14);
    assert_eq!(forecast.dates.len(), 14);
    assert_eq!(forecast.model_used, summary.model_used);
    assert_eq!(
        forecast.dates[0],
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Duration::days(150)
    );
    assert!(forecast.dates.windows(2).all(|w| w[1] - w[0] == Duration::days(1)));

    // 4. The series keeps rising, so should the forecast level
    let mean_forecast = forecast.predictions.iter().sum::<f64>() / 14.0;
    assert!(mean_forecast > 560.0 && mean_forecast < 700.0);
}

#[test]
fn test_state_round_trip_reproduces_forecast() {
    let data_file = create_sample_data(90);
    let series = ObservationSeries::from_csv_path(data_file.path()).unwrap();

    let mut forecaster = Forecaster::new(ForecasterConfig::default());
    forecaster.train(&series).unwrap();
    let original = forecaster.predict(10).unwrap();

    let state = forecaster.export_state().unwrap();
    let restored = Forecaster::from_state(ForecasterConfig::default(), &state).unwrap();
    let replayed = restored.predict(10).unwrap();

    assert_eq!(original.dates, replayed.dates);
    assert_eq!(original.model_used, replayed.model_used);
    for (a, b) in original.predictions.iter().zip(&replayed.predictions) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn test_fitted_model_is_usable_directly() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let values: Vec<f64> = (0..60).map(|i| 40.0 + (i % 7) as f64).collect();
    let series = ObservationSeries::from_daily_values(start, &values).unwrap();

    let mut forecaster = Forecaster::new(ForecasterConfig::default());
    forecaster.train(&series).unwrap();

    let state = forecaster.state().unwrap();
    let direct = state.model.forecast(3).unwrap();
    assert_eq!(direct.len(), 3);
    assert!(state.model.residual_std() >= 0.0);
}

#[test]
fn test_corrupt_state_is_rejected() {
    let result = Forecaster::from_state(ForecasterConfig::default(), "{not json");
    assert!(matches!(result, Err(ForecastError::Serialization(_))));
}
