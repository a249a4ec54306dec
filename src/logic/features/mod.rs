//! Features Module - Feature Extraction Engine
//!
//! Tách logic trích xuất features từ raw telemetry.
//! Layout is versioned so persisted models can detect incompatible input.

pub mod layout;
pub mod vector;
pub mod extractor;
pub mod stats;

#[cfg(test)]
mod tests;

pub use layout::{feature_name, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::FeatureVector;
pub use extractor::{extract, extract_many, extract_payload, FeatureExtractor};
pub use stats::{rate_of_change, rolling_stats, RollingStats};
