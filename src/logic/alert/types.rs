use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::logic::detection::AnomalyCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: Uuid,
    pub device_id: String,
    pub ts: DateTime<Utc>,
    pub severity: Severity,
    /// >= 0, larger = more anomalous
    pub score: f64,
    /// Display text only; use `category()` for classification
    pub reason: String,
    /// Set by the acknowledgment workflow, never by detection
    pub acknowledged: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Alert {
    /// Category attached at detection time, if any
    pub fn category(&self) -> Option<AnomalyCategory> {
        self.metadata
            .get(super::META_CATEGORY)
            .and_then(Value::as_str)
            .and_then(AnomalyCategory::parse)
    }

    pub fn metric(&self) -> Option<&str> {
        self.metadata.get(super::META_METRIC).and_then(Value::as_str)
    }
}
