//! Detection Module - per-reading anomaly decision
//!
//! Model trước, fallback z-score khi model chưa trained.
//!
//! # Architecture
//! - `types.rs`: AnomalyDecision, DetectionMethod, AnomalyCategory
//! - `zscore.rs`: rolling z-score on temperature
//! - `category.rs`: anomaly categorisation for both paths
//! - `orchestrator.rs`: DetectionOrchestrator

pub mod category;
pub mod orchestrator;
pub mod types;
pub mod zscore;

#[cfg(test)]
mod tests;

pub use orchestrator::DetectionOrchestrator;
pub use types::{AnomalyCategory, AnomalyDecision, DetectionError, DetectionMethod, ZScore};
pub use zscore::ZScoreSettings;
