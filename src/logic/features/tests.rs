//! Integration Tests for Feature Extraction
//!
//! Tests extractor + stats hoạt động đúng với dữ liệu thực tế.

use chrono::{TimeZone, Utc};
use serde_json::json;

use super::*;
use super::layout::*;
use crate::logic::telemetry::TelemetryReading;

fn reading_at(hour: u32, day: u32) -> TelemetryReading {
    // 2024-01-01 is a Monday
    TelemetryReading::new("esp32-001", Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap())
}

#[test]
fn test_vector_length_always_seven() {
    let sparse = TelemetryReading { device_id: "x".into(), ..Default::default() };
    let full = reading_at(12, 3)
        .with_temperature(22.0)
        .with_humidity(48.0)
        .with_network(5000, 3000, 4);

    assert_eq!(extract(&sparse).values.len(), FEATURE_COUNT);
    assert_eq!(extract(&full).values.len(), FEATURE_COUNT);
    assert_eq!(extract_payload(&json!({})).values.len(), FEATURE_COUNT);
}

#[test]
fn test_all_absent_record_is_all_zero() {
    let sparse = TelemetryReading { device_id: "x".into(), ..Default::default() };
    assert_eq!(extract(&sparse).values, [0.0; FEATURE_COUNT]);
}

#[test]
fn test_log1p_transform() {
    let zero = reading_at(0, 1).with_network(0, 0, 0);
    assert_eq!(extract(&zero).values[IDX_TX], 0.0);

    // tx = e - 1 ≈ 1.718 -> log1p ≈ 1.0 (payload keeps the fraction)
    let v = extract_payload(&json!({"tx_bytes": std::f64::consts::E - 1.0, "ts": "2024-01-01T00:00:00Z"}));
    assert!((v.values[IDX_TX] - 1.0).abs() < 1e-9);

    let big = reading_at(0, 1).with_network(1_000_000, 0, 0);
    assert!((extract(&big).values[IDX_TX] - (1_000_001f64).ln()).abs() < 1e-9);
}

#[test]
fn test_time_normalization() {
    // Monday 00:00 -> (0, 0)
    let v = extract(&reading_at(0, 1));
    assert_eq!(v.values[IDX_HOUR], 0.0);
    assert_eq!(v.values[IDX_WEEKDAY], 0.0);

    // Sunday 23:00 -> (1, 1)
    let v = extract(&reading_at(23, 7));
    assert_eq!(v.values[IDX_HOUR], 1.0);
    assert_eq!(v.values[IDX_WEEKDAY], 1.0);

    // Wednesday 12:00
    let v = extract(&reading_at(12, 3));
    assert!((v.values[IDX_HOUR] - 12.0 / 23.0).abs() < 1e-12);
    assert!((v.values[IDX_WEEKDAY] - 2.0 / 6.0).abs() < 1e-12);
}

#[test]
fn test_payload_matches_record() {
    let record = reading_at(9, 2)
        .with_temperature(24.5)
        .with_humidity(55.0)
        .with_network(2048, 1024, 6);

    let payload = json!({
        "device_id": "esp32-001",
        "ts": "2024-01-02T09:00:00Z",
        "sensors": {"temperature": 24.5, "humidity": 55.0},
        "net": {"tx_bytes": 2048, "rx_bytes": 1024, "connections": 6},
    });

    assert_eq!(extract(&record).values, extract_payload(&payload).values);
}

#[test]
fn test_payload_invalid_timestamp_zeroes_time() {
    let v = extract_payload(&json!({"temperature": 20.0, "ts": "not a date"}));
    assert_eq!(v.values[IDX_TEMPERATURE], 20.0);
    assert_eq!(v.values[IDX_HOUR], 0.0);
    assert_eq!(v.values[IDX_WEEKDAY], 0.0);
}

#[test]
fn test_deterministic() {
    let r = reading_at(5, 4).with_temperature(19.0).with_network(10, 20, 1);
    assert_eq!(extract(&r), extract(&r));
}

#[test]
fn test_extract_many() {
    let empty = extract_many(&[]);
    assert_eq!(empty.shape(), &[0, FEATURE_COUNT]);

    let readings = vec![
        reading_at(1, 1).with_temperature(20.0),
        reading_at(2, 1).with_temperature(21.0),
        reading_at(3, 1).with_temperature(22.0),
    ];
    let m = extract_many(&readings);
    assert_eq!(m.shape(), &[3, FEATURE_COUNT]);
    assert_eq!(m[[0, IDX_TEMPERATURE]], 20.0);
    assert_eq!(m[[2, IDX_TEMPERATURE]], 22.0);
}

#[test]
fn test_rolling_stats() {
    assert_eq!(rolling_stats(&[reading_at(0, 1).with_temperature(30.0)], 10), RollingStats::default());

    let readings: Vec<_> = [18.0, 20.0, 22.0, 100.0]
        .iter()
        .enumerate()
        .map(|(i, t)| reading_at(i as u32, 1).with_temperature(*t).with_humidity(50.0))
        .collect();

    // Window 3 skips the first reading
    let stats = rolling_stats(&readings, 3);
    let expected_mean = (20.0 + 22.0 + 100.0) / 3.0;
    assert!((stats.temp_mean - expected_mean).abs() < 1e-9);
    assert!(stats.temp_std > 0.0);
    assert_eq!(stats.hum_mean, 50.0);
    assert_eq!(stats.hum_std, 0.0);
}

#[test]
fn test_rate_of_change() {
    let readings = vec![
        reading_at(0, 1).with_temperature(20.0),
        reading_at(1, 1).with_temperature(23.5),
    ];
    assert!((rate_of_change(&readings, "temperature") - 3.5).abs() < 1e-12);
    assert_eq!(rate_of_change(&readings, "humidity"), 0.0);
    assert_eq!(rate_of_change(&readings[..1], "temperature"), 0.0);
}
