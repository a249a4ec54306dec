//! Alert Module
//!
//! Chuyển quyết định anomaly thành Alert (severity, score, reason, metadata).

pub mod factory;
pub mod types;


pub use factory::{alert_score, severity_for, AlertFactory};
pub use types::{Alert, Severity};

/// Metadata keys
pub const META_METRIC: &str = "metric";
pub const META_MODEL: &str = "model";
pub const META_METHOD: &str = "method";
pub const META_CATEGORY: &str = "category";
