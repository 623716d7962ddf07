use emission_core::series::parse_timestamp;
use emission_core::{CoreError, ObservationSeries, Scope};
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

// Helper function to create a small emissions CSV
fn create_sample_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(file, "date,emissions,scope,activity_type,company_id").unwrap();
    writeln!(file, "2024-01-03,30.0,SCOPE_2,electricity,7").unwrap();
    writeln!(file, "2024-01-01,10.0,SCOPE_1,fuel,7").unwrap();
    writeln!(file, "2024-01-02,,SCOPE_1,fuel,7").unwrap();
    writeln!(file, "2024-01-05,50.0,,,").unwrap();

    file
}

#[test]
fn test_csv_ingestion_normalizes() {
    let file = create_sample_csv();
    let series = ObservationSeries::from_csv_path(file.path()).unwrap();

    assert_eq!(series.len(), 4);
    // Missing value on the 2nd carries the 1st forward
    assert_eq!(series.values(), vec![10.0, 10.0, 30.0, 50.0]);
    assert_eq!(series.observations()[2].scope, Some(Scope::Scope2));
    assert_eq!(series.observations()[0].company_id, Some(7));
    assert_eq!(series.observations()[3].scope, None);

    let timestamps = series.timestamps();
    assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_csv_with_canonical_headers() {
    let data = "timestamp,value\n2024-02-01 08:00:00,1.5\n2024-02-01 20:00:00,2.5\n";
    let series = ObservationSeries::from_csv_reader(data.as_bytes()).unwrap();
    assert_eq!(series.len(), 2);

    let daily = series.daily_totals();
    assert_eq!(daily.values(), vec![4.0]);
}

#[test]
fn test_csv_rejects_bad_timestamp() {
    let data = "date,emissions\nyesterday,1.0\n";
    let result = ObservationSeries::from_csv_reader(data.as_bytes());
    assert!(matches!(result, Err(CoreError::MalformedTimestamp(_))));
}

#[test]
fn test_csv_rejects_unknown_scope() {
    let data = "date,emissions,scope\n2024-01-01,1.0,SCOPE_7\n";
    let result = ObservationSeries::from_csv_reader(data.as_bytes());
    assert!(matches!(result, Err(CoreError::UnknownScope(_))));
}

#[test]
fn test_csv_without_rows_is_empty() {
    let data = "date,emissions\n";
    let result = ObservationSeries::from_csv_reader(data.as_bytes());
    assert!(matches!(result, Err(CoreError::EmptySeries)));
}

#[rstest]
#[case("2024-03-10")]
#[case("2024-03-10 00:00:00")]
#[case("2024-03-10T00:00:00+00:00")]
fn test_timestamp_formats_agree(#[case] input: &str) {
    let expected = parse_timestamp("2024-03-10").unwrap();
    assert_eq!(parse_timestamp(input).unwrap(), expected);
}
