use chrono::{Duration, SubsecRound, TimeZone, Utc};
use serde_json::Map;
use uuid::Uuid;

use super::*;
use crate::logic::alert::{Alert, Severity};
use crate::logic::telemetry::TelemetryReading;

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

fn reading(device: &str, minute: i64, temperature: Option<f64>) -> TelemetryReading {
    let ts = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap() + Duration::minutes(minute);
    TelemetryReading {
        temperature,
        ..TelemetryReading::new(device, ts).with_network(100, 50, 2)
    }
}

fn alert(device: &str, metric: &str) -> Alert {
    let mut metadata = Map::new();
    metadata.insert("metric".into(), metric.into());
    metadata.insert("category".into(), "network_spike".into());
    Alert {
        alert_id: Uuid::new_v4(),
        device_id: device.to_string(),
        ts: Utc::now().trunc_subsecs(0),
        severity: Severity::High,
        score: 0.42,
        reason: "anomaly detected by model (score=0.4200)".into(),
        acknowledged: false,
        metadata,
    }
}

#[test]
fn test_recent_temperatures_most_recent_first() {
    let store = store();
    for (minute, t) in [(0, Some(20.0)), (1, None), (2, Some(21.0)), (3, Some(22.0))] {
        store.save_telemetry(&reading("dev-a", minute, t)).unwrap();
    }
    store.save_telemetry(&reading("dev-b", 4, Some(99.0))).unwrap();

    assert_eq!(store.recent_temperatures("dev-a", 20).unwrap(), vec![22.0, 21.0, 20.0]);
    assert_eq!(store.recent_temperatures("dev-a", 2).unwrap(), vec![22.0, 21.0]);
    assert!(store.recent_temperatures("unknown", 20).unwrap().is_empty());
}

#[test]
fn test_telemetry_round_trip() {
    let store = store();
    let mut r = reading("dev-a", 0, Some(23.5)).with_humidity(40.0);
    r.motion = Some(true);
    r.led_states = Some([("red".to_string(), true)].into_iter().collect());
    store.save_telemetry(&r).unwrap();

    let stored = store.recent_telemetry(Some("dev-a"), 10).unwrap();
    assert_eq!(stored, vec![r]);
    assert_eq!(store.recent_telemetry(None, 10).unwrap().len(), 1);
}

#[test]
fn test_oversized_byte_counters_saturate() {
    let store = store();
    let mut r = reading("dev-a", 0, Some(23.5));
    r.tx_bytes = u64::MAX;
    r.rx_bytes = i64::MAX as u64 + 1;
    store.save_telemetry(&r).unwrap();
    store.save_telemetry(&reading("dev-a", 1, Some(23.5))).unwrap();

    let stored = store.recent_telemetry(Some("dev-a"), 10).unwrap();
    assert_eq!(stored[1].tx_bytes, i64::MAX as u64);
    assert_eq!(stored[1].rx_bytes, i64::MAX as u64);
    assert_eq!(stored[0].tx_bytes, 100);

    // Volume total must not overflow on saturated rows
    assert!(store.dashboard_summary().is_ok());
}

#[test]
fn test_devices() {
    let store = store();
    assert!(store.device("dev-a").unwrap().is_none());

    store
        .upsert_device(&DeviceInfo {
            name: Some("Greenhouse sensor".into()),
            location: Some("Serre 2".into()),
            device_type: Some("esp32".into()),
            ..DeviceInfo::new("dev-a")
        })
        .unwrap();
    // Telemetry only refreshes last_seen
    store.save_telemetry(&reading("dev-a", 5, Some(20.0))).unwrap();

    let device = store.device("dev-a").unwrap().unwrap();
    assert_eq!(device.name.as_deref(), Some("Greenhouse sensor"));
    assert_eq!(device.location.as_deref(), Some("Serre 2"));
    assert!(device.last_seen.is_some());
    assert_eq!(store.list_devices().unwrap().len(), 1);
}

#[test]
fn test_alert_lifecycle() {
    let store = store();
    let a = alert("dev-a", "ml");
    let b = alert("dev-b", "temperature");
    store.save_alert(&a).unwrap();
    store.save_alert(&b).unwrap();

    assert_eq!(store.get_alert(a.alert_id).unwrap(), Some(a.clone()));
    assert_eq!(store.active_alerts(10).unwrap().len(), 2);

    assert!(store.acknowledge_alert(a.alert_id).unwrap());
    assert!(!store.acknowledge_alert(Uuid::new_v4()).unwrap());

    let active = store.active_alerts(10).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].alert_id, b.alert_id);
    assert_eq!(store.recent_alerts(10).unwrap().len(), 2);
}

#[test]
fn test_dashboard_summary() {
    let store = store();
    let now = Utc::now();
    store
        .save_telemetry(&TelemetryReading::new("dev-a", now).with_network(1000, 24, 1))
        .unwrap();
    store.save_alert(&alert("dev-a", "ml")).unwrap();
    store.save_alert(&alert("dev-a", "temperature")).unwrap();

    let summary = store.dashboard_summary().unwrap();
    assert_eq!(summary.total_devices, 1);
    assert_eq!(summary.alerts_24h, 2);
    assert_eq!(summary.alerts_active, 2);
    assert_eq!(summary.anomalies_24h, 1);
    assert_eq!(summary.telemetry_24h, 1);
    assert_eq!(summary.data_volume_today_bytes, 1024);
}

#[test]
fn test_open_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db").join("sentinel.db");
    {
        let store = SqliteStore::open(&path).unwrap();
        store.save_telemetry(&reading("dev-a", 0, Some(20.0))).unwrap();
    }
    let reopened = SqliteStore::open(&path).unwrap();
    assert_eq!(reopened.recent_temperatures("dev-a", 5).unwrap(), vec![20.0]);
}
