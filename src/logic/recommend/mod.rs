//! Recommend Module
//!
//! Sinh khuyến nghị (priority, urgency, root causes, actions) từ Alert.
//!
//! ## Structure
//! - `types.rs` - Recommendation, Priority, status
//! - `playbook.rs` - Root causes / actions per anomaly category
//! - `matcher.rs` - Fallback matching on reason text
//! - `engine.rs` - RecommendationEngine

pub mod engine;
pub mod matcher;
pub mod playbook;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::{bucket, RecommendationEngine};
pub use matcher::match_reason;
pub use types::{Priority, Recommendation, RecommendationStatus, RecommendError};
