use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::Map;
use uuid::Uuid;

use super::*;
use crate::logic::alert::{Alert, Severity, META_CATEGORY};
use crate::logic::baseline::BaselineGenerator;
use crate::logic::detection::AnomalyCategory;
use crate::logic::model::{AnomalyModel, ForestConfig, MemoryModelStore};
use crate::logic::store::{AlertSink, DeviceInfo, SqliteStore, TelemetrySink};
use crate::logic::telemetry::TelemetryReading;

fn model(trained: bool) -> Arc<AnomalyModel> {
    let model = AnomalyModel::with_store(
        Box::new(MemoryModelStore::new()),
        ForestConfig { n_estimators: 50, ..ForestConfig::default() },
        BaselineGenerator::default(),
    );
    if trained {
        assert!(model.train(300, 0.05));
    }
    Arc::new(model)
}

fn alert(score: f64, reason: &str, category: Option<AnomalyCategory>) -> Alert {
    let mut metadata = Map::new();
    if let Some(category) = category {
        metadata.insert(META_CATEGORY.into(), category.as_str().into());
    }
    Alert {
        alert_id: Uuid::new_v4(),
        device_id: "esp32-01".into(),
        ts: Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap(),
        severity: Severity::High,
        score,
        reason: reason.into(),
        acknowledged: false,
        metadata,
    }
}

fn history(n: usize) -> Vec<TelemetryReading> {
    let base = Utc.with_ymd_and_hms(2024, 3, 6, 11, 0, 0).unwrap();
    (0..n)
        .map(|i| TelemetryReading::new("esp32-01", base + Duration::minutes(i as i64)).with_temperature(20.0))
        .collect()
}

// ===== BUCKETS =====

#[test]
fn test_bucket_boundaries() {
    assert_eq!(bucket(0.9), (Priority::Critical, "immediate"));
    assert_eq!(bucket(0.75), (Priority::High, "within 2 hours"));
    assert_eq!(bucket(0.6), (Priority::High, "within 2 hours"));
    assert_eq!(bucket(0.5), (Priority::Medium, "within 24 hours"));
    assert_eq!(bucket(0.3), (Priority::Low, "continuous monitoring"));
    assert_eq!(bucket(0.0), (Priority::Low, "continuous monitoring"));
}

#[test]
fn test_critical_score() {
    let engine = RecommendationEngine::new(model(true));
    let rec = engine.recommend(&alert(0.9, "anomaly detected by model (score=0.9000)", None), None);

    assert_eq!(rec.status, RecommendationStatus::MlGenerated);
    assert_eq!(rec.priority, Priority::Critical);
    assert_eq!(rec.urgency, "immediate");
    assert!((rec.confidence - 0.9).abs() < 1e-12);
    assert!(rec.actions[0].starts_with("ESCALATE"));
    assert_eq!(rec.category, Some(AnomalyCategory::Unclassified));
}

#[test]
fn test_low_score() {
    let engine = RecommendationEngine::new(model(true));
    let rec = engine.recommend(&alert(0.2, "anomaly detected by model (score=0.2000)", None), None);

    assert_eq!(rec.priority, Priority::Low);
    assert_eq!(rec.urgency, "continuous monitoring");
    assert!(!rec.actions.iter().any(|a| a.starts_with("ESCALATE") || a.starts_with("Schedule")));
}

#[test]
fn test_high_score_gets_scheduling_guidance() {
    let engine = RecommendationEngine::new(model(true));
    let rec = engine.recommend(&alert(0.6, "network spike", None), None);

    assert_eq!(rec.priority, Priority::High);
    assert_eq!(rec.category, Some(AnomalyCategory::NetworkSpike));
    assert_eq!(rec.actions.last().unwrap(), "Schedule a technician intervention within 2 hours");
}

#[test]
fn test_confidence_capped_and_sign_ignored() {
    let engine = RecommendationEngine::new(model(true));
    let rec = engine.recommend(&alert(-4.0, "x", None), None);

    assert_eq!(rec.priority, Priority::Critical);
    assert_eq!(rec.confidence, 1.0);
    assert_eq!(rec.ml_score, -4.0);
}

// ===== CATEGORIES =====

#[test]
fn test_absolute_temperature_in_reason() {
    let engine = RecommendationEngine::new(model(true));
    let rec = engine.recommend(&alert(0.5, "température 85°c atteinte", None), None);

    assert_eq!(rec.category, Some(AnomalyCategory::CriticalTemperature));
    let book = playbook::playbook(AnomalyCategory::CriticalTemperature);
    assert_eq!(rec.root_causes, book.root_causes.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    assert!(rec.actions.iter().any(|a| a.contains("Power down")));
}

#[test]
fn test_metadata_category_wins_over_reason() {
    let engine = RecommendationEngine::new(model(true));
    let rec = engine.recommend(
        &alert(0.5, "température 85°c atteinte", Some(AnomalyCategory::ExcessiveHumidity)),
        None,
    );

    assert_eq!(rec.category, Some(AnomalyCategory::ExcessiveHumidity));
    assert!(rec.actions.iter().any(|a| a.contains("water ingress")));
}

#[test]
fn test_every_category_has_a_playbook() {
    for category in AnomalyCategory::ALL {
        let book = playbook::playbook(category);
        assert!(!book.root_causes.is_empty(), "{}", category);
        assert!(!book.actions.is_empty(), "{}", category);
    }
}

// ===== HISTORY =====

#[test]
fn test_trend_suggestion_needs_more_than_five_readings() {
    let engine = RecommendationEngine::new(model(true));
    let a = alert(0.2, "x", None);

    let short = engine.recommend(&a, Some(history(5).as_slice()));
    let long = engine.recommend(&a, Some(history(6).as_slice()));

    assert_eq!(long.actions.len(), short.actions.len() + 1);
    assert!(long.actions.last().unwrap().contains("last 6 readings"));
}

// ===== DEGRADED =====

#[test]
fn test_model_not_ready() {
    let engine = RecommendationEngine::new(model(false));
    let rec = engine.recommend(&alert(0.9, "network spike", None), Some(history(10).as_slice()));

    assert_eq!(rec.status, RecommendationStatus::MlNotReady);
    assert_eq!(rec.priority, Priority::Low);
    assert_eq!(rec.confidence, 0.0);
    assert_eq!(rec.actions.len(), 1);
    assert!(rec.root_causes.is_empty());
}

#[test]
fn test_non_finite_score_is_error() {
    let engine = RecommendationEngine::new(model(true));
    let rec = engine.recommend(&alert(f64::NAN, "x", None), None);

    assert_eq!(rec.status, RecommendationStatus::Error);
    assert_eq!(rec.confidence, 0.0);
}

#[test]
fn test_status_serialization() {
    let engine = RecommendationEngine::new(model(false));
    let rec = engine.recommend(&alert(0.1, "x", None), None);
    let json = serde_json::to_value(&rec).unwrap();

    assert_eq!(json["status"], "ml_not_ready");
    assert_eq!(json["priority"], "low");
    assert!(json.get("device_name").is_none());
}

// ===== STORE-BACKED =====

#[test]
fn test_device_enrichment_and_active_alerts() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    store
        .upsert_device(&DeviceInfo {
            name: Some("Cold room sensor".into()),
            location: Some("Warehouse B".into()),
            device_type: Some("esp32".into()),
            ..DeviceInfo::new("esp32-01")
        })
        .unwrap();
    for r in history(8) {
        store.save_telemetry(&r).unwrap();
    }

    let active = alert(0.8, "x", Some(AnomalyCategory::TemperatureTrend));
    let acked = alert(0.4, "x", None);
    store.save_alert(&active).unwrap();
    store.save_alert(&acked).unwrap();
    assert!(store.acknowledge_alert(acked.alert_id).unwrap());

    let engine = RecommendationEngine::new(model(true)).with_registry(store.clone());
    let recs = engine.recommend_active(&store, 10).unwrap();

    assert_eq!(recs.len(), 1);
    let rec = &recs[0];
    assert_eq!(rec.alert_id, active.alert_id);
    assert_eq!(rec.device_name.as_deref(), Some("Cold room sensor"));
    assert_eq!(rec.device_location.as_deref(), Some("Warehouse B"));
    assert_eq!(rec.category, Some(AnomalyCategory::TemperatureTrend));
    assert!(rec.actions.last().unwrap().contains("last 8 readings"));
}

#[test]
fn test_unknown_device_omits_fields() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let engine = RecommendationEngine::new(model(true)).with_registry(store);
    let rec = engine.recommend(&alert(0.4, "x", None), None);

    assert!(rec.device_name.is_none());
    assert!(rec.device_type.is_none());
}
