//! Logic Module - Detection Pipeline & Engines
//!
//! Chứa các engines xử lý: Features, Baseline, Model, Detection, Alert, Recommend.
//!
//! ## Data flow
//! - `features/` - Feature extraction (7-value vector)
//! - `baseline/` - Synthetic "normal" corpus for bootstrap training
//! - `model/` - Isolation forest, status state machine, versioned artifact
//! - `detection/` - Model first, rolling z-score fallback
//! - `alert/` - Decision -> Alert
//! - `recommend/` - Alert -> Recommendation
//! - `store/` - Collaborator traits + SQLite implementation

pub mod config;
pub mod telemetry;
pub mod features;
pub mod baseline;
pub mod model;
pub mod detection;
pub mod alert;
pub mod recommend;
pub mod store;
pub mod analysis;
