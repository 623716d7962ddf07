use emission_core::CoreError;
use emission_forecast::ForecastError;

#[test]
fn test_error_conversion() {
    let core_error = CoreError::EmptySeries;
    let forecast_error = ForecastError::from(core_error);

    match forecast_error {
        ForecastError::Core(CoreError::EmptySeries) => {}
        other => panic!("Expected Core variant, got {:?}", other),
    }

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::Serialization(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::DataInsufficient {
        required: 14,
        available: 9,
    };
    let message = error.to_string();
    assert!(message.contains("14"));
    assert!(message.contains("9"));

    let error = ForecastError::InvalidParameter("steps must be greater than zero".to_string());
    assert!(error.to_string().contains("steps must be greater than zero"));
}
