//! Model Artifact - persisted form of a fitted model
//!
//! File layout: a small envelope (format version, algorithm, SHA-256 of the
//! body) around the JSON body. The body carries the feature layout it was
//! trained with, so a model built for a different layout is refused on load.

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::ModelError;
use crate::logic::baseline::TrafficScale;
use super::forest::IsolationForest;
use crate::logic::features::layout::{layout_hash, validate_layout, FEATURE_COUNT, FEATURE_VERSION};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
pub const ALGORITHM: &str = "isolation_forest";

// ============================================================================
// TRAINING PROVENANCE
// ============================================================================

/// Where the training corpus came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainingSource {
    /// Synthetic bootstrap corpus, not representative of real devices
    Synthetic {
        seed: u64,
        samples: usize,
        /// Scale of the generated tx/rx columns
        #[serde(default)]
        traffic_scale: TrafficScale,
    },
    /// Real readings supplied by the caller
    Historical { rows: usize },
}

impl TrainingSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

// ============================================================================
// FEATURE PROFILE
// ============================================================================

/// Per-feature mean/std of the training corpus
///
/// Used to explain which feature drove a model verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfile {
    pub mean: [f64; FEATURE_COUNT],
    pub std: [f64; FEATURE_COUNT],
}

impl FeatureProfile {
    pub fn from_matrix(data: &Array2<f64>) -> Self {
        let mut mean = [0.0; FEATURE_COUNT];
        let mut std = [0.0; FEATURE_COUNT];

        for (i, column) in data.columns().into_iter().enumerate().take(FEATURE_COUNT) {
            let values: Vec<f64> = column.iter().copied().collect();
            let (m, s) = crate::logic::features::stats::mean_std(&values);
            mean[i] = m;
            std[i] = s;
        }

        Self { mean, std }
    }

    /// Signed z-score per feature; 0.0 where the training column was constant
    pub fn deviations(&self, values: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            if self.std[i] > f64::EPSILON {
                out[i] = (values[i] - self.mean[i]) / self.std[i];
            }
        }
        out
    }
}

// ============================================================================
// FITTED MODEL
// ============================================================================

/// Everything needed to reproduce predictions after a reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub trained_at: DateTime<Utc>,
    pub source: TrainingSource,
    pub profile: FeatureProfile,
    pub forest: IsolationForest,
}

impl FittedModel {
    pub fn new(forest: IsolationForest, profile: FeatureProfile, source: TrainingSource) -> Self {
        Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            trained_at: Utc::now(),
            source,
            profile,
            forest,
        }
    }
}

/// On-disk envelope
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactFile {
    format_version: u32,
    algorithm: String,
    /// SHA-256 (hex) of `body`
    checksum: String,
    body: String,
}

fn checksum(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn encode(model: &FittedModel) -> Result<Vec<u8>, ModelError> {
    let body = serde_json::to_string(model)?;
    let file = ArtifactFile {
        format_version: ARTIFACT_FORMAT_VERSION,
        algorithm: ALGORITHM.to_string(),
        checksum: checksum(&body),
        body,
    };
    Ok(serde_json::to_vec(&file)?)
}

/// Decode and verify: envelope version, algorithm, checksum, feature layout
pub fn decode(bytes: &[u8]) -> Result<FittedModel, ModelError> {
    let file: ArtifactFile = serde_json::from_slice(bytes)?;

    if file.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ModelError::UnsupportedFormat {
            found: file.format_version,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    if file.algorithm != ALGORITHM {
        return Err(ModelError::UnsupportedAlgorithm(file.algorithm));
    }
    if checksum(&file.body) != file.checksum {
        return Err(ModelError::ChecksumMismatch);
    }

    let model: FittedModel = serde_json::from_str(&file.body)?;
    validate_layout(model.feature_version, model.layout_hash)?;

    if model.forest.n_features != FEATURE_COUNT {
        return Err(ModelError::ShapeMismatch {
            expected: FEATURE_COUNT,
            actual: model.forest.n_features,
        });
    }
    model.forest.validate()?;

    Ok(model)
}
