//! Anomaly Model Engine
//!
//! Owns the fitted Isolation Forest, its lifecycle status and persistence.
//! Training is single-flight; the fit runs outside the state lock and the new
//! model is swapped in atomically, so predictions never see a half-built model.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array2;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::artifact::{self, FeatureProfile, FittedModel, TrainingSource};
use super::error::ModelError;
use super::forest::{ForestConfig, IsolationForest};
use super::status::{ModelStatus, StatusEvent, StatusReport};
use super::storage::{FileModelStore, ModelStore};
use crate::logic::baseline::BaselineGenerator;
use crate::logic::config::PipelineConfig;
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Result of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub is_anomaly: bool,
    /// Raw decision value: negative = outlier. 0.0 when not trained.
    pub score: f64,
    /// `Trained`, `Pending` (no usable model) or `Error` (prediction failed)
    pub status: ModelStatus,
}

impl Prediction {
    pub fn pending() -> Self {
        Self { is_anomaly: false, score: 0.0, status: ModelStatus::Pending }
    }

    fn error() -> Self {
        Self { is_anomaly: false, score: 0.0, status: ModelStatus::Error }
    }

    pub fn as_tuple(&self) -> (bool, f64, &'static str) {
        (self.is_anomaly, self.score, self.status.as_str())
    }
}

/// Cooperative cancellation for long training runs
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct ModelState {
    status: ModelStatus,
    fitted: Option<Arc<FittedModel>>,
    last_error: Option<String>,
}

impl ModelState {
    fn apply(&mut self, event: StatusEvent) {
        match self.status.apply(event) {
            Some(next) => self.status = next,
            None => log::warn!("Ignored status event {:?} in state {}", event, self.status),
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct AnomalyModel {
    state: RwLock<ModelState>,
    /// Held for the whole train / load critical section
    train_lock: Mutex<()>,
    store: Box<dyn ModelStore>,
    forest_config: ForestConfig,
    generator: BaselineGenerator,
}

impl AnomalyModel {
    /// Engine with an explicit store; starts pending, nothing loaded
    pub fn with_store(
        store: Box<dyn ModelStore>,
        forest_config: ForestConfig,
        generator: BaselineGenerator,
    ) -> Self {
        Self {
            state: RwLock::new(ModelState {
                status: ModelStatus::Pending,
                fitted: None,
                last_error: None,
            }),
            train_lock: Mutex::new(()),
            store,
            forest_config,
            generator,
        }
    }

    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_store(
            Box::new(FileModelStore::new(&config.model_path)),
            ForestConfig {
                n_estimators: config.n_estimators,
                max_samples: config.max_samples,
                random_seed: config.random_seed,
            },
            BaselineGenerator::new(config.traffic_scale()),
        )
    }

    /// Startup path: load a persisted artifact if one exists.
    /// No artifact → stays pending; unreadable artifact → error.
    pub fn open(config: &PipelineConfig) -> Self {
        let model = Self::new(config);
        model.restore(false);
        model
    }

    // ------------------------------------------------------------------------
    // TRAINING
    // ------------------------------------------------------------------------

    /// Train on a synthetic baseline of `n_samples` rows
    pub fn train(&self, n_samples: usize, contamination: f64) -> bool {
        let seed = self.forest_config.random_seed;
        let generator = self.generator;
        let source = TrainingSource::Synthetic {
            seed,
            samples: n_samples,
            traffic_scale: generator.traffic_scale,
        };
        self.report(self.train_with(
            move || Ok(generator.generate_normal(n_samples, seed)?),
            contamination,
            source,
            &CancelToken::new(),
        ))
    }

    /// Train on a caller-supplied (n, FEATURE_COUNT) matrix
    pub fn train_on(&self, data: &Array2<f64>, contamination: f64, source: TrainingSource) -> bool {
        self.report(self.train_cancellable(data, contamination, source, &CancelToken::new()))
    }

    /// Like `train_on`, but abandons the fit once `cancel` fires.
    /// The previous model and status are kept.
    pub fn train_cancellable(
        &self,
        data: &Array2<f64>,
        contamination: f64,
        source: TrainingSource,
        cancel: &CancelToken,
    ) -> Result<(), ModelError> {
        self.train_with(|| Ok(data.clone()), contamination, source, cancel)
    }

    fn report(&self, result: Result<(), ModelError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Model training did not complete: {}", e);
                false
            }
        }
    }

    fn train_with<F>(
        &self,
        build_corpus: F,
        contamination: f64,
        source: TrainingSource,
        cancel: &CancelToken,
    ) -> Result<(), ModelError>
    where
        F: FnOnce() -> Result<Array2<f64>, ModelError>,
    {
        let _guard = self.train_lock.try_lock().ok_or(ModelError::AlreadyTraining)?;

        let previous = {
            let mut state = self.state.write();
            let previous = state.status;
            state.apply(StatusEvent::TrainStarted);
            previous
        };

        log::info!("Training isolation forest ({:?}, contamination={})", source, contamination);

        let fitted = build_corpus().and_then(|data| {
            if data.ncols() != FEATURE_COUNT {
                return Err(ModelError::ShapeMismatch { expected: FEATURE_COUNT, actual: data.ncols() });
            }
            let forest = IsolationForest::fit(&data, self.forest_config, contamination, &|| cancel.is_cancelled())?;
            Ok(FittedModel::new(forest, FeatureProfile::from_matrix(&data), source))
        });

        let fitted = match fitted {
            Ok(fitted) => Arc::new(fitted),
            Err(ModelError::Cancelled) => {
                self.state.write().apply(StatusEvent::TrainCancelled { previous });
                log::info!("Training cancelled, status restored to {}", previous);
                return Err(ModelError::Cancelled);
            }
            Err(e) => {
                let mut state = self.state.write();
                state.apply(StatusEvent::TrainFailed);
                state.last_error = Some(e.to_string());
                log::error!("Training failed: {}", e);
                return Err(e);
            }
        };

        {
            let mut state = self.state.write();
            state.fitted = Some(fitted.clone());
            state.last_error = None;
            state.apply(StatusEvent::TrainSucceeded);
        }

        log::info!(
            "Model trained: {} trees, offset={:.4}",
            fitted.forest.n_trees(),
            fitted.forest.offset
        );

        // A trained model stays usable even when the artifact can't be written
        if let Err(e) = self.write_artifact(&fitted) {
            log::error!("Failed to persist model to {}: {}", self.store.location(), e);
        }

        Ok(())
    }

    // ------------------------------------------------------------------------
    // INFERENCE
    // ------------------------------------------------------------------------

    /// Predict on one feature vector. Not trained → (false, 0.0, pending).
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        self.predict_values(features.as_slice())
    }

    /// Predict on raw values; a wrong feature count is an error, not a panic
    pub fn predict_values(&self, values: &[f64]) -> Prediction {
        let Some(fitted) = self.trained_model() else {
            return Prediction::pending();
        };

        match fitted.forest.decision_function(values) {
            Ok(score) => Prediction { is_anomaly: score < 0.0, score, status: ModelStatus::Trained },
            Err(e) => {
                log::warn!("Model prediction failed: {}", e);
                Prediction::error()
            }
        }
    }

    /// Row-wise prediction over a feature matrix
    pub fn predict_batch(&self, data: &Array2<f64>) -> Vec<Prediction> {
        data.rows()
            .into_iter()
            .map(|row| self.predict_values(&row.to_vec()))
            .collect()
    }

    /// Model snapshot, only when status is trained
    pub fn trained_model(&self) -> Option<Arc<FittedModel>> {
        let state = self.state.read();
        match state.status {
            ModelStatus::Trained => state.fitted.clone(),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // STATUS
    // ------------------------------------------------------------------------

    pub fn status(&self) -> ModelStatus {
        self.state.read().status
    }

    pub fn is_trained(&self) -> bool {
        self.status() == ModelStatus::Trained
    }

    pub fn status_report(&self) -> StatusReport {
        let state = self.state.read();
        let fitted = state.fitted.as_ref();
        StatusReport {
            status: state.status,
            trained_at: fitted.map(|f| f.trained_at),
            model_loaded: fitted.is_some(),
            model_path: self.store.location(),
            training_source: fitted.map(|f| f.source.clone()),
            n_estimators: fitted.map(|f| f.forest.n_trees()),
            last_error: state.last_error.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // PERSISTENCE
    // ------------------------------------------------------------------------

    /// Write the in-memory model to the store
    pub fn persist(&self) -> Result<(), ModelError> {
        let fitted = self.state.read().fitted.clone().ok_or(ModelError::NotTrained)?;
        self.write_artifact(&fitted)
    }

    /// Reload from the store. Missing or corrupt artifact → status error.
    pub fn load(&self) -> bool {
        self.restore(true)
    }

    fn write_artifact(&self, fitted: &FittedModel) -> Result<(), ModelError> {
        let bytes = artifact::encode(fitted)?;
        self.store.write(&bytes)?;
        log::info!("Model persisted to {}", self.store.location());
        Ok(())
    }

    fn restore(&self, missing_is_error: bool) -> bool {
        let _guard = self.train_lock.lock();

        let loaded = self.store.read().and_then(|bytes| match bytes {
            Some(bytes) => artifact::decode(&bytes).map(Some),
            None => Ok(None),
        });

        let mut state = self.state.write();
        match loaded {
            Ok(Some(fitted)) => {
                log::info!(
                    "Model loaded from {} (trained {})",
                    self.store.location(),
                    fitted.trained_at.to_rfc3339()
                );
                state.fitted = Some(Arc::new(fitted));
                state.last_error = None;
                state.apply(StatusEvent::Loaded);
                true
            }
            Ok(None) if !missing_is_error => {
                log::info!("No model artifact at {}, status pending", self.store.location());
                false
            }
            Ok(None) => {
                let e = ModelError::ArtifactMissing(self.store.location());
                log::error!("Model load failed: {}", e);
                state.last_error = Some(e.to_string());
                state.apply(StatusEvent::LoadFailed);
                false
            }
            Err(e) => {
                log::error!("Model load failed from {}: {}", self.store.location(), e);
                state.last_error = Some(e.to_string());
                state.apply(StatusEvent::LoadFailed);
                false
            }
        }
    }
}
