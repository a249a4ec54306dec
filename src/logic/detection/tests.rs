use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use super::*;
use crate::logic::baseline::{BaselineGenerator, TrafficScale};
use crate::logic::config::PipelineConfig;
use crate::logic::model::{AnomalyModel, ForestConfig, MemoryModelStore, ModelStatus};
use crate::logic::store::{SqliteStore, StoreError, TelemetryHistory, TelemetrySink};
use crate::logic::telemetry::TelemetryReading;

// ===== FAKE COLLABORATORS =====

struct FixedHistory(Vec<f64>);

impl TelemetryHistory for FixedHistory {
    fn recent_temperatures(&self, _device_id: &str, limit: usize) -> Result<Vec<f64>, StoreError> {
        Ok(self.0.iter().take(limit).copied().collect())
    }
}

struct FailingHistory;

impl TelemetryHistory for FailingHistory {
    fn recent_temperatures(&self, _device_id: &str, _limit: usize) -> Result<Vec<f64>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

struct SlowHistory;

impl TelemetryHistory for SlowHistory {
    fn recent_temperatures(&self, _device_id: &str, _limit: usize) -> Result<Vec<f64>, StoreError> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(vec![20.0; 20])
    }
}

fn untrained() -> Arc<AnomalyModel> {
    Arc::new(AnomalyModel::with_store(
        Box::new(MemoryModelStore::new()),
        ForestConfig::default(),
        BaselineGenerator::default(),
    ))
}

fn trained() -> Arc<AnomalyModel> {
    let model = AnomalyModel::with_store(
        Box::new(MemoryModelStore::new()),
        ForestConfig::default(),
        BaselineGenerator::new(TrafficScale::Log1p),
    );
    assert!(model.train(1000, 0.05));
    Arc::new(model)
}

fn orchestrator(model: Arc<AnomalyModel>, history: Arc<dyn TelemetryHistory>) -> DetectionOrchestrator {
    DetectionOrchestrator::new(model, history, &PipelineConfig::default())
}

fn alternating(n: usize) -> Vec<f64> {
    (0..n).map(|i| if i % 2 == 0 { 19.0 } else { 21.0 }).collect()
}

fn reading(temperature: Option<f64>) -> TelemetryReading {
    // Wednesday noon
    let ts = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
    TelemetryReading {
        temperature,
        ..TelemetryReading::new("esp32-01", ts)
            .with_humidity(50.0)
            .with_network(3000, 1800, 5)
    }
}

// ===== STATISTICAL FALLBACK =====

#[tokio::test]
async fn test_ten_sigma_reading_is_statistical_anomaly() {
    let detector = orchestrator(untrained(), Arc::new(FixedHistory(alternating(20))));
    let decision = detector.detect(&reading(Some(30.0))).await;

    assert!(decision.is_anomaly);
    assert_eq!(decision.method, DetectionMethod::Statistical);
    assert_eq!(decision.model_status, ModelStatus::Pending);
    assert!((decision.score - 10.0).abs() < 1e-9);
    assert_eq!(decision.category, Some(AnomalyCategory::TemperatureOscillation));

    let z = decision.zscore.unwrap();
    assert!((z.mean - 20.0).abs() < 1e-9);
    assert!((z.std - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_within_band_is_not_anomalous() {
    let detector = orchestrator(untrained(), Arc::new(FixedHistory(alternating(20))));
    let decision = detector.detect(&reading(Some(22.5))).await;

    assert!(!decision.is_anomaly);
    assert_eq!(decision.method, DetectionMethod::None);
}

#[tokio::test]
async fn test_insufficient_history() {
    let detector = orchestrator(untrained(), Arc::new(FixedHistory(vec![20.0, 21.0, 19.0, 20.0])));
    let decision = detector.detect(&reading(Some(500.0))).await;

    assert!(!decision.is_anomaly);
    assert_eq!(decision.method, DetectionMethod::None);
}

#[tokio::test]
async fn test_missing_temperature() {
    let detector = orchestrator(untrained(), Arc::new(FixedHistory(alternating(20))));
    let decision = detector.detect(&reading(None)).await;

    assert_eq!(decision, AnomalyDecision::none(ModelStatus::Pending));
}

#[tokio::test]
async fn test_history_failure_degrades_to_not_anomalous() {
    let detector = orchestrator(untrained(), Arc::new(FailingHistory));
    let decision = detector.detect(&reading(Some(90.0))).await;

    assert!(!decision.is_anomaly);
    assert_eq!(decision.method, DetectionMethod::None);
}

#[tokio::test]
async fn test_history_timeout_degrades_to_not_anomalous() {
    let detector = orchestrator(untrained(), Arc::new(SlowHistory))
        .with_settings(ZScoreSettings::default(), Duration::from_millis(20));
    let decision = detector.detect(&reading(Some(90.0))).await;

    assert!(!decision.is_anomaly);
    assert_eq!(decision.method, DetectionMethod::None);
}

#[tokio::test]
async fn test_fallback_against_sqlite_history() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let base = Utc.with_ymd_and_hms(2024, 3, 6, 11, 0, 0).unwrap();
    for (i, t) in alternating(25).into_iter().enumerate() {
        let r = TelemetryReading::new("esp32-01", base + chrono::Duration::minutes(i as i64))
            .with_temperature(t);
        store.save_telemetry(&r).unwrap();
    }

    let detector = orchestrator(untrained(), store);
    let decision = detector.detect(&reading(Some(30.0))).await;

    assert!(decision.is_anomaly);
    assert_eq!(decision.method, DetectionMethod::Statistical);
}

// ===== MODEL PATH =====

#[tokio::test]
async fn test_trained_model_takes_precedence() {
    // History would flag this reading; the model path must win
    let detector = orchestrator(trained(), Arc::new(FixedHistory(alternating(20))));
    let decision = detector.detect(&reading(Some(22.0))).await;

    assert_eq!(decision.method, DetectionMethod::Model);
    assert_eq!(decision.model_status, ModelStatus::Trained);
    assert!(!decision.is_anomaly);
    assert!(decision.category.is_none());
    assert!(decision.zscore.is_none());
}

#[tokio::test]
async fn test_model_anomaly_is_categorised() {
    let detector = orchestrator(trained(), Arc::new(FailingHistory));

    // Off the training profile on every sensor and network feature
    let ts = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
    let runaway = TelemetryReading::new("esp32-01", ts)
        .with_temperature(150.0)
        .with_humidity(2.0)
        .with_network(1_000_000_000_000, 1_000_000_000_000, 400);
    let decision = detector.detect(&runaway).await;

    assert!(decision.is_anomaly);
    assert!(decision.score < 0.0);
    assert_eq!(decision.method, DetectionMethod::Model);
    assert_eq!(decision.category, Some(AnomalyCategory::CriticalTemperature));
}

#[tokio::test]
async fn test_model_ignores_single_feature_excursion() {
    // Temperature alone beyond the training range is not an outlier for the forest
    let detector = orchestrator(trained(), Arc::new(FixedHistory(alternating(20))));
    let decision = detector.detect(&reading(Some(150.0))).await;

    assert_eq!(decision.method, DetectionMethod::Model);
    assert!(!decision.is_anomaly);
    assert!(decision.category.is_none());
    assert!(decision.zscore.is_none());
}
