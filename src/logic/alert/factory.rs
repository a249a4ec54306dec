//! Alert Factory - AnomalyDecision → Alert

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::types::{Alert, Severity};
use super::{META_CATEGORY, META_METRIC, META_METHOD, META_MODEL};
use crate::logic::detection::{AnomalyDecision, DetectionMethod};
use crate::logic::telemetry::TelemetrySummary;

pub const MODEL_NAME: &str = "isolation_forest";

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertFactory;

impl AlertFactory {
    pub fn new() -> Self {
        Self
    }

    /// Build an alert for an anomalous decision; `None` when not anomalous
    pub fn build(
        &self,
        device_id: &str,
        ts: DateTime<Utc>,
        decision: &AnomalyDecision,
        summary: &TelemetrySummary,
    ) -> Option<Alert> {
        if !decision.is_anomaly {
            return None;
        }

        let score = alert_score(decision);
        let mut metadata = Map::new();

        let reason = match decision.method {
            DetectionMethod::Model => {
                metadata.insert(META_METRIC.into(), "ml".into());
                metadata.insert(META_MODEL.into(), MODEL_NAME.into());
                format!("anomaly detected by model (score={:.4})", score)
            }
            DetectionMethod::Statistical => {
                metadata.insert(META_METRIC.into(), "temperature".into());
                match decision.zscore {
                    Some(z) => {
                        metadata.insert("window_mean".into(), z.mean.into());
                        metadata.insert("window_std".into(), z.std.into());
                        format!("abnormal temperature: {} (μ={:.2}, σ={:.2})", z.value, z.mean, z.std)
                    }
                    None => format!("abnormal temperature (z={:.2})", score),
                }
            }
            DetectionMethod::None => format!("anomaly detected (score={:.4})", score),
        };

        metadata.insert(META_METHOD.into(), decision.method.as_str().into());
        if let Some(category) = decision.category {
            metadata.insert(META_CATEGORY.into(), category.as_str().into());
        }
        if let Ok(Value::Object(fields)) = serde_json::to_value(summary) {
            metadata.extend(fields);
        }

        Some(Alert {
            alert_id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            ts,
            severity: severity_for(decision),
            score,
            reason,
            acknowledged: false,
            metadata,
        })
    }
}

/// Both detection paths alert at high severity
pub fn severity_for(_decision: &AnomalyDecision) -> Severity {
    Severity::High
}

/// Non-negative alert score: model decision values are inverted
/// (more negative = more anomalous), z-scores are used as-is.
pub fn alert_score(decision: &AnomalyDecision) -> f64 {
    let score = match decision.method {
        DetectionMethod::Model => -decision.score,
        _ => decision.score.abs(),
    };
    if score.is_finite() {
        score.max(0.0)
    } else {
        0.0
    }
}
