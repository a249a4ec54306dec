//! Model Status - lifecycle state machine
//!
//! pending → training → trained | error; trained/error → training (retrain).
//! Loading an artifact moves any non-training state to trained or error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::TrainingSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Pending,
    Training,
    Trained,
    Error,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Training => "training",
            Self::Trained => "trained",
            Self::Error => "error",
        }
    }

    /// Apply a lifecycle event; `None` = transition not allowed
    pub fn apply(self, event: StatusEvent) -> Option<ModelStatus> {
        use ModelStatus::*;
        match (self, event) {
            (Training, StatusEvent::TrainStarted) => None,
            (_, StatusEvent::TrainStarted) => Some(Training),
            (Training, StatusEvent::TrainSucceeded) => Some(Trained),
            (Training, StatusEvent::TrainFailed) => Some(Error),
            (Training, StatusEvent::TrainCancelled { previous }) if previous != Training => Some(previous),
            (Training, _) => None,
            (_, StatusEvent::Loaded) => Some(Trained),
            (_, StatusEvent::LoadFailed) => Some(Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    TrainStarted,
    TrainSucceeded,
    TrainFailed,
    /// Restores the status held before training started
    TrainCancelled { previous: ModelStatus },
    Loaded,
    LoadFailed,
}

/// Status report for callers / UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: ModelStatus,
    pub trained_at: Option<DateTime<Utc>>,
    /// A fitted model is in memory (may be stale when status = error)
    pub model_loaded: bool,
    pub model_path: String,
    pub training_source: Option<TrainingSource>,
    pub n_estimators: Option<usize>,
    pub last_error: Option<String>,
}
