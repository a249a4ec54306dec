//! Telemetry Pipeline - per-reading flow
//!
//! detect → persist reading → build + persist alert on anomaly.
//! Detection runs before the reading is stored so it is not part of its own
//! history window. Sink failures are logged; the caller always gets an outcome.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::logic::alert::{Alert, AlertFactory};
use crate::logic::config::PipelineConfig;
use crate::logic::detection::{AnomalyDecision, DetectionOrchestrator};
use crate::logic::model::AnomalyModel;
use crate::logic::store::{AlertSink, SqliteStore, StoreError, TelemetrySink};
use crate::logic::telemetry::TelemetryReading;

/// What happened to one reading
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub device_id: String,
    pub decision: AnomalyDecision,
    /// Reading written to the telemetry sink
    pub stored: bool,
    pub alert: Option<Alert>,
    /// Alert written to the alert sink
    pub alert_stored: bool,
}

pub struct TelemetryPipeline {
    detector: DetectionOrchestrator,
    telemetry: Arc<dyn TelemetrySink>,
    alerts: Arc<dyn AlertSink>,
    factory: AlertFactory,
}

impl TelemetryPipeline {
    pub fn new(
        detector: DetectionOrchestrator,
        telemetry: Arc<dyn TelemetrySink>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            detector,
            telemetry,
            alerts,
            factory: AlertFactory::new(),
        }
    }

    /// Pipeline where one SQLite store is history, telemetry sink and alert sink
    pub fn with_store(model: Arc<AnomalyModel>, store: Arc<SqliteStore>, config: &PipelineConfig) -> Self {
        let detector = DetectionOrchestrator::new(model, store.clone(), config);
        Self::new(detector, store.clone(), store)
    }

    pub fn detector(&self) -> &DetectionOrchestrator {
        &self.detector
    }

    pub async fn process(&self, reading: &TelemetryReading) -> PipelineOutcome {
        let decision = self.detector.detect(reading).await;

        let sink = Arc::clone(&self.telemetry);
        let record = reading.clone();
        let stored = match run_blocking(move || sink.save_telemetry(&record)).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to store telemetry for {}: {}", reading.device_id, e);
                false
            }
        };

        let ts = reading.ts.unwrap_or_else(Utc::now);
        let alert = self
            .factory
            .build(&reading.device_id, ts, &decision, &reading.summary());

        let mut alert_stored = false;
        if let Some(alert) = &alert {
            log::info!(
                "Alert {} for {}: {} (score={:.4})",
                alert.alert_id,
                alert.device_id,
                alert.reason,
                alert.score
            );

            let sink = Arc::clone(&self.alerts);
            let record = alert.clone();
            match run_blocking(move || sink.save_alert(&record)).await {
                Ok(()) => alert_stored = true,
                Err(e) => log::error!("Failed to store alert {}: {}", alert.alert_id, e),
            }
        }

        PipelineOutcome {
            device_id: reading.device_id.clone(),
            decision,
            stored,
            alert,
            alert_stored,
        }
    }
}

async fn run_blocking<F>(f: F) -> Result<(), StoreError>
where
    F: FnOnce() -> Result<(), StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
}
