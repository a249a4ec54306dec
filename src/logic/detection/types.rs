use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::logic::model::ModelStatus;
use crate::logic::store::StoreError;

// ===== DETECTION METHOD =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Model,
    Statistical,
    None,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Statistical => "statistical",
            Self::None => "none",
        }
    }
}

// ===== ANOMALY CATEGORY =====

/// What kind of anomaly was detected. Produced once by detection and carried
/// on the alert so recommendations don't depend on reason wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyCategory {
    CriticalTemperature,
    TemperatureTrend,
    TemperatureOscillation,
    NetworkSpike,
    MultipleConnections,
    HighTxVolume,
    ExcessiveHumidity,
    TempHumidityCorrelation,
    DivergingBehavior,
    ErraticPattern,
    Unclassified,
}

impl AnomalyCategory {
    pub const ALL: [AnomalyCategory; 11] = [
        Self::CriticalTemperature,
        Self::TemperatureTrend,
        Self::TemperatureOscillation,
        Self::NetworkSpike,
        Self::MultipleConnections,
        Self::HighTxVolume,
        Self::ExcessiveHumidity,
        Self::TempHumidityCorrelation,
        Self::DivergingBehavior,
        Self::ErraticPattern,
        Self::Unclassified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CriticalTemperature => "critical_temperature",
            Self::TemperatureTrend => "temperature_trend",
            Self::TemperatureOscillation => "temperature_oscillation",
            Self::NetworkSpike => "network_spike",
            Self::MultipleConnections => "multiple_connections",
            Self::HighTxVolume => "high_tx_volume",
            Self::ExcessiveHumidity => "excessive_humidity",
            Self::TempHumidityCorrelation => "temp_humidity_correlation",
            Self::DivergingBehavior => "diverging_behavior",
            Self::ErraticPattern => "erratic_pattern",
            Self::Unclassified => "unclassified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl std::fmt::Display for AnomalyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Z-SCORE =====

/// Outcome of the rolling z-score test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScore {
    pub value: f64,
    pub mean: f64,
    pub std: f64,
    /// |value - mean| / std
    pub score: f64,
}

// ===== DECISION =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDecision {
    pub is_anomaly: bool,
    /// Model decision value (negative = outlier) or z-score magnitude
    pub score: f64,
    pub method: DetectionMethod,
    pub model_status: ModelStatus,
    pub category: Option<AnomalyCategory>,
    /// Window statistics, statistical path only
    pub zscore: Option<ZScore>,
}

impl AnomalyDecision {
    /// Not anomalous, nothing ran
    pub fn none(model_status: ModelStatus) -> Self {
        Self {
            is_anomaly: false,
            score: 0.0,
            method: DetectionMethod::None,
            model_status,
            category: None,
            zscore: None,
        }
    }
}

// ===== ERRORS =====

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("history query timed out after {0:?}")]
    HistoryTimeout(Duration),

    #[error("history query failed: {0}")]
    History(#[from] StoreError),

    #[error("history task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
