//! Detection Orchestrator
//!
//! Model first; when the model is not trained, fall back to a rolling z-score
//! on temperature. Never fails the caller: every error path degrades to
//! "not anomalous" and is logged here.

use std::sync::Arc;
use std::time::Duration;

use super::category;
use super::types::{AnomalyDecision, DetectionError, DetectionMethod};
use super::zscore::{self, ZScoreSettings};
use crate::logic::config::PipelineConfig;
use crate::logic::features::extract;
use crate::logic::model::{AnomalyModel, ModelStatus};
use crate::logic::store::TelemetryHistory;
use crate::logic::telemetry::TelemetryReading;

pub struct DetectionOrchestrator {
    model: Arc<AnomalyModel>,
    history: Arc<dyn TelemetryHistory>,
    settings: ZScoreSettings,
    history_timeout: Duration,
}

impl DetectionOrchestrator {
    pub fn new(
        model: Arc<AnomalyModel>,
        history: Arc<dyn TelemetryHistory>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            model,
            history,
            settings: ZScoreSettings::from(config),
            history_timeout: config.history_timeout,
        }
    }

    pub fn with_settings(mut self, settings: ZScoreSettings, history_timeout: Duration) -> Self {
        self.settings = settings;
        self.history_timeout = history_timeout;
        self
    }

    pub fn model(&self) -> &Arc<AnomalyModel> {
        &self.model
    }

    /// Decide whether `reading` is anomalous.
    ///
    /// `reading` must not be in the history store yet, otherwise it would be
    /// part of its own baseline window.
    pub async fn detect(&self, reading: &TelemetryReading) -> AnomalyDecision {
        let features = extract(reading);
        let prediction = self.model.predict(&features);

        if prediction.status == ModelStatus::Trained {
            let category = if prediction.is_anomaly {
                self.model
                    .trained_model()
                    .map(|fitted| category::classify_model(&features.values, &fitted.profile))
            } else {
                None
            };

            log::debug!(
                "Model decision for {}: anomaly={} score={:.4}",
                reading.device_id,
                prediction.is_anomaly,
                prediction.score
            );

            return AnomalyDecision {
                is_anomaly: prediction.is_anomaly,
                score: prediction.score,
                method: DetectionMethod::Model,
                model_status: prediction.status,
                category,
                zscore: None,
            };
        }

        match self.statistical(reading, prediction.status).await {
            Ok(decision) => decision,
            Err(e) => {
                log::warn!("Statistical fallback skipped for {}: {}", reading.device_id, e);
                AnomalyDecision::none(prediction.status)
            }
        }
    }

    async fn statistical(
        &self,
        reading: &TelemetryReading,
        model_status: ModelStatus,
    ) -> Result<AnomalyDecision, DetectionError> {
        let Some(value) = reading.temperature else {
            return Ok(AnomalyDecision::none(model_status));
        };

        let history = self.fetch_history(&reading.device_id).await?;

        let Some(z) = zscore::evaluate(value, &history, &self.settings) else {
            log::debug!(
                "Z-score not computable for {} ({} usable readings)",
                reading.device_id,
                history.len()
            );
            return Ok(AnomalyDecision::none(model_status));
        };

        if !z.exceeds(self.settings.threshold) {
            return Ok(AnomalyDecision::none(model_status));
        }

        Ok(AnomalyDecision {
            is_anomaly: true,
            score: z.score,
            method: DetectionMethod::Statistical,
            model_status,
            category: Some(category::classify_statistical(value, &history)),
            zscore: Some(z),
        })
    }

    /// Recent temperatures, most recent first, bounded by the history timeout
    async fn fetch_history(&self, device_id: &str) -> Result<Vec<f64>, DetectionError> {
        let history = Arc::clone(&self.history);
        let device_id = device_id.to_string();
        let limit = self.settings.window;

        let query = tokio::task::spawn_blocking(move || history.recent_temperatures(&device_id, limit));

        let values = tokio::time::timeout(self.history_timeout, query)
            .await
            .map_err(|_| DetectionError::HistoryTimeout(self.history_timeout))???;

        Ok(values)
    }
}
