//! Recommendation Engine
//!
//! Alert → priority bucket + root causes + actions. Computed on demand, never
//! stored. Internal failures come back as a recommendation with status
//! `error`; nothing is propagated to the caller.

use std::sync::Arc;

use chrono::Utc;

use super::matcher::match_reason;
use super::playbook::playbook;
use super::types::{Priority, Recommendation, RecommendationStatus, RecommendError};
use crate::constants::TREND_HISTORY_MIN;
use crate::logic::alert::Alert;
use crate::logic::detection::AnomalyCategory;
use crate::logic::model::AnomalyModel;
use crate::logic::store::{DeviceInfo, DeviceRegistry, SqliteStore};
use crate::logic::telemetry::TelemetryReading;

const NOT_READY_ACTION: &str =
    "Model not trained yet: inspect the device manually and review its recent telemetry";
const ESCALATION_BANNER: &str =
    "ESCALATE NOW: notify the on-call operator and open an incident for this device";

/// Priority and urgency for an anomaly intensity in [0, ∞)
pub fn bucket(score: f64) -> (Priority, &'static str) {
    if score > 0.75 {
        (Priority::Critical, "immediate")
    } else if score > 0.5 {
        (Priority::High, "within 2 hours")
    } else if score > 0.3 {
        (Priority::Medium, "within 24 hours")
    } else {
        (Priority::Low, "continuous monitoring")
    }
}

pub struct RecommendationEngine {
    model: Arc<AnomalyModel>,
    devices: Option<Arc<dyn DeviceRegistry>>,
}

impl RecommendationEngine {
    pub fn new(model: Arc<AnomalyModel>) -> Self {
        Self { model, devices: None }
    }

    /// Enrich recommendations with device name / location / type
    pub fn with_registry(mut self, devices: Arc<dyn DeviceRegistry>) -> Self {
        self.devices = Some(devices);
        self
    }

    pub fn recommend(&self, alert: &Alert, history: Option<&[TelemetryReading]>) -> Recommendation {
        if !self.model.is_trained() {
            return self.not_ready(alert);
        }

        match self.build(alert, history) {
            Ok(recommendation) => recommendation,
            Err(e) => {
                log::error!("Recommendation failed for alert {}: {}", alert.alert_id, e);
                self.failed(alert)
            }
        }
    }

    /// Recommendations for unacknowledged alerts, each with its device's
    /// recent telemetry as history
    pub fn recommend_active(
        &self,
        store: &SqliteStore,
        limit: usize,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let alerts = store.active_alerts(limit)?;
        let mut out = Vec::with_capacity(alerts.len());

        for alert in &alerts {
            let history = store.recent_telemetry(Some(alert.device_id.as_str()), TREND_HISTORY_MIN * 4)?;
            out.push(self.recommend(alert, Some(history.as_slice())));
        }

        log::debug!("Generated {} recommendations for active alerts", out.len());
        Ok(out)
    }

    fn build(
        &self,
        alert: &Alert,
        history: Option<&[TelemetryReading]>,
    ) -> Result<Recommendation, RecommendError> {
        let score = alert.score.abs();
        if !score.is_finite() {
            return Err(RecommendError::NonFiniteScore(alert.score));
        }

        let (priority, urgency) = bucket(score);
        let category = alert.category().unwrap_or_else(|| match_reason(&alert.reason));
        let book = playbook(category);

        let mut actions: Vec<String> = Vec::with_capacity(book.actions.len() + 2);
        if priority == Priority::Critical {
            actions.push(ESCALATION_BANNER.to_string());
        }
        actions.extend(book.actions.iter().map(|a| a.to_string()));
        if matches!(priority, Priority::High | Priority::Medium) {
            actions.push(format!("Schedule a technician intervention {}", urgency));
        }
        if let Some(history) = history.filter(|h| h.len() > TREND_HISTORY_MIN) {
            actions.push(format!(
                "Analyze the trend over the last {} readings before closing the alert",
                history.len()
            ));
        }

        let mut recommendation = self.skeleton(alert, RecommendationStatus::MlGenerated);
        recommendation.priority = priority;
        recommendation.urgency = urgency.to_string();
        recommendation.confidence = score.min(1.0);
        recommendation.category = Some(category);
        recommendation.root_causes = book.root_causes.iter().map(|c| c.to_string()).collect();
        recommendation.actions = actions;

        if category == AnomalyCategory::Unclassified {
            log::debug!("No category for alert {}, generic playbook", alert.alert_id);
        }

        Ok(recommendation)
    }

    fn not_ready(&self, alert: &Alert) -> Recommendation {
        let mut recommendation = self.skeleton(alert, RecommendationStatus::MlNotReady);
        recommendation.actions = vec![NOT_READY_ACTION.to_string()];
        recommendation
    }

    fn failed(&self, alert: &Alert) -> Recommendation {
        let mut recommendation = self.skeleton(alert, RecommendationStatus::Error);
        recommendation.ml_score = 0.0;
        recommendation
    }

    /// Low priority, zero confidence, device fields filled when known
    fn skeleton(&self, alert: &Alert, status: RecommendationStatus) -> Recommendation {
        let device = self.lookup(&alert.device_id).unwrap_or_default();
        let (priority, urgency) = bucket(0.0);

        Recommendation {
            status,
            alert_id: alert.alert_id,
            device_id: alert.device_id.clone(),
            device_name: device.name,
            device_location: device.location,
            device_type: device.device_type,
            priority,
            urgency: urgency.to_string(),
            confidence: 0.0,
            category: None,
            root_causes: Vec::new(),
            actions: Vec::new(),
            ml_score: alert.score,
            generated_at: Utc::now(),
        }
    }

    fn lookup(&self, device_id: &str) -> Option<DeviceInfo> {
        let registry = self.devices.as_ref()?;
        match registry.device(device_id) {
            Ok(device) => device,
            Err(e) => {
                log::warn!("Device lookup failed for {}: {}", device_id, e);
                None
            }
        }
    }
}
