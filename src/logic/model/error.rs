//! Model errors

use crate::logic::baseline::BaselineError;
use crate::logic::features::layout::LayoutMismatchError;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("contamination must be in (0, 0.5], got {0}")]
    InvalidContamination(f64),

    #[error("need at least {required} training samples, got {got}")]
    InsufficientSamples { got: usize, required: usize },

    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("input contains NaN or infinite values")]
    NonFiniteInput,

    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("training cancelled")]
    Cancelled,

    #[error("training already in progress")]
    AlreadyTraining,

    #[error("no trained model")]
    NotTrained,

    #[error("model artifact not found at {0}")]
    ArtifactMissing(String),

    #[error("artifact checksum mismatch")]
    ChecksumMismatch,

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("unsupported algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error(transparent)]
    Baseline(#[from] BaselineError),

    #[error("artifact I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
