//! Model Module - Isolation Forest anomaly model
//!
//! Train / predict / persist cho unsupervised anomaly detection.
//!
//! # Architecture
//! - `forest.rs`: Isolation Forest (trees, path length, scores)
//! - `threshold.rs`: contamination → decision offset
//! - `status.rs`: lifecycle state machine
//! - `artifact.rs`: versioned, checksummed artifact format
//! - `storage.rs`: artifact stores (file, memory)
//! - `engine.rs`: `AnomalyModel` - thread-safe train/predict/load

pub mod artifact;
pub mod engine;
pub mod error;
pub mod forest;
pub mod status;
pub mod storage;
pub mod threshold;


pub use artifact::{FeatureProfile, FittedModel, TrainingSource};
pub use engine::{AnomalyModel, CancelToken, Prediction};
pub use error::ModelError;
pub use forest::{ForestConfig, IsolationForest};
pub use status::{ModelStatus, StatusReport};
pub use storage::{FileModelStore, MemoryModelStore, ModelStore};
