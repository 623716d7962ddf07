use approx::assert_abs_diff_eq;
use chrono::{TimeZone, Utc};
use emission_core::ObservationSeries;
use emission_forecast::metrics::forecast_accuracy;
use emission_forecast::trend::TrendDirection;
use emission_forecast::TrendAnalyzer;
use pretty_assertions::assert_eq;

#[test]
fn test_regression_metrics() {
    let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
    let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];

    let accuracy = forecast_accuracy(&predicted, &actual).unwrap();

    assert_abs_diff_eq!(accuracy.mae, 2.4, epsilon = 1e-9);
    assert_abs_diff_eq!(accuracy.mse, 6.0, epsilon = 1e-9);
    assert_abs_diff_eq!(accuracy.rmse, 6.0_f64.sqrt(), epsilon = 1e-9);
    assert!(accuracy.mape > 0.0 && accuracy.mape < 15.0);
    assert!(accuracy.smape > 0.0 && accuracy.smape < 15.0);
}

#[test]
fn test_trend_analysis_on_declining_series() {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    // A year of data with a summer peak on top of a slow decline
    let values: Vec<f64> = (0..365)
        .map(|i| {
            let seasonal = 30.0 * (2.0 * std::f64::consts::PI * (i as f64 - 91.0) / 365.0).sin();
            1000.0 - 0.5 * i as f64 + seasonal
        })
        .collect();
    let series = ObservationSeries::from_daily_values(start, &values).unwrap();

    let analysis = TrendAnalyzer::new().analyze(&series).unwrap();

    assert_eq!(analysis.statistics.count, 365);
    assert_eq!(
        analysis.trend_analysis.trend_direction,
        TrendDirection::Decreasing
    );
    assert!(analysis.trend_analysis.slope < 0.0);
    assert!(analysis.trend_analysis.is_significant);
    assert_eq!(analysis.seasonality.monthly_averages.len(), 12);
    assert_eq!(analysis.seasonality.low_month, 12);
    assert!(analysis.seasonality.seasonal_variation > 0.0);
}

#[test]
fn test_flat_series_has_no_change_points() {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let series = ObservationSeries::from_daily_values(start, &[7.0; 90]).unwrap();

    let analysis = TrendAnalyzer::new().analyze(&series).unwrap();
    assert_eq!(analysis.change_points.num_change_points, 0);
    assert_eq!(analysis.statistics.std, 0.0);
    assert!(!analysis.trend_analysis.is_significant);
}
