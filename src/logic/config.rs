//! Pipeline Configuration
//!
//! Tất cả tham số runtime của pipeline, đọc từ env với fallback về constants.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{self, env_flag, env_or};
use crate::logic::baseline::TrafficScale;

/// Detection pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model artifact location
    pub model_path: PathBuf,

    /// SQLite database for telemetry/alerts/devices
    pub database_path: PathBuf,

    /// Number of isolation trees
    pub n_estimators: usize,

    /// Subsample cap per tree
    pub max_samples: usize,

    /// Seed for forest construction and synthetic baseline
    pub random_seed: u64,

    /// Synthetic corpus size for bootstrap training
    pub bootstrap_samples: usize,

    /// Expected anomaly proportion
    pub contamination: f64,

    /// Train on the synthetic baseline at startup when no artifact exists
    pub auto_bootstrap: bool,

    /// Apply log1p to the synthetic traffic columns so the bootstrap corpus
    /// is on the same scale as extracted features
    pub baseline_log_traffic: bool,

    /// Rolling window for the z-score fallback
    pub history_window: usize,

    /// Minimum usable readings for the z-score fallback
    pub min_history: usize,

    /// Z-score threshold
    pub zscore_threshold: f64,

    /// Timeout on the history query
    pub history_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let data_dir = constants::default_data_dir();
        Self {
            model_path: data_dir.join(constants::DEFAULT_MODEL_FILE),
            database_path: data_dir.join(constants::DEFAULT_DATABASE_FILE),
            n_estimators: constants::DEFAULT_N_ESTIMATORS,
            max_samples: constants::DEFAULT_MAX_SAMPLES,
            random_seed: constants::DEFAULT_RANDOM_SEED,
            bootstrap_samples: constants::DEFAULT_BOOTSTRAP_SAMPLES,
            contamination: constants::DEFAULT_CONTAMINATION,
            auto_bootstrap: true,
            baseline_log_traffic: true,
            history_window: constants::DEFAULT_HISTORY_WINDOW,
            min_history: constants::DEFAULT_MIN_HISTORY,
            zscore_threshold: constants::DEFAULT_ZSCORE_THRESHOLD,
            history_timeout: Duration::from_millis(constants::DEFAULT_HISTORY_TIMEOUT_MS),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_dir = env::var("SENTINEL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| constants::default_data_dir());

        Self {
            model_path: env::var("SENTINEL_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join(constants::DEFAULT_MODEL_FILE)),

            database_path: env::var("SENTINEL_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join(constants::DEFAULT_DATABASE_FILE)),

            n_estimators: env_or("SENTINEL_N_ESTIMATORS", defaults.n_estimators),
            max_samples: env_or("SENTINEL_MAX_SAMPLES", defaults.max_samples),
            random_seed: env_or("SENTINEL_RANDOM_SEED", defaults.random_seed),
            bootstrap_samples: env_or("SENTINEL_BOOTSTRAP_SAMPLES", defaults.bootstrap_samples),
            contamination: env_or("SENTINEL_CONTAMINATION", defaults.contamination),
            auto_bootstrap: env_flag("SENTINEL_AUTO_BOOTSTRAP", defaults.auto_bootstrap),
            baseline_log_traffic: env_flag("SENTINEL_BASELINE_LOG_TRAFFIC", defaults.baseline_log_traffic),
            history_window: env_or("SENTINEL_HISTORY_WINDOW", defaults.history_window),
            min_history: env_or("SENTINEL_MIN_HISTORY", defaults.min_history),
            zscore_threshold: env_or("SENTINEL_ZSCORE_THRESHOLD", defaults.zscore_threshold),
            history_timeout: Duration::from_millis(env_or(
                "SENTINEL_HISTORY_TIMEOUT_MS",
                constants::DEFAULT_HISTORY_TIMEOUT_MS,
            )),
        }
    }

    pub fn traffic_scale(&self) -> TrafficScale {
        if self.baseline_log_traffic {
            TrafficScale::Log1p
        } else {
            TrafficScale::Raw
        }
    }

    /// Config rooted in a specific directory (tests, embedded hosts)
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            model_path: dir.join(constants::DEFAULT_MODEL_FILE),
            database_path: dir.join(constants::DEFAULT_DATABASE_FILE),
            ..Default::default()
        }
    }
}
