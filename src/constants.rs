//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Runtime overrides come from `SENTINEL_*` environment variables
//! (see `logic::config::PipelineConfig`).

use std::path::PathBuf;

/// App name (also the data directory name)
pub const APP_NAME: &str = "iot-sentinel";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Model artifact file name
pub const DEFAULT_MODEL_FILE: &str = "model_isolation_forest.json";

/// SQLite database file name
pub const DEFAULT_DATABASE_FILE: &str = "sentinel.db";

// ============================================
// Model defaults
// ============================================

/// Number of isolation trees
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Subsample cap per tree ("auto" = min(256, n_samples))
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Fixed seed for reproducible fits and synthetic baselines
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Bootstrap corpus size
pub const DEFAULT_BOOTSTRAP_SAMPLES: usize = 1000;

/// Expected anomaly proportion used to calibrate the threshold
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

// ============================================
// Statistical fallback defaults
// ============================================

/// Rolling window size (readings)
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Minimum usable readings before the z-score test runs
pub const DEFAULT_MIN_HISTORY: usize = 5;

/// Distance from the rolling mean, in standard deviations
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// Upper bound on the history query (milliseconds)
pub const DEFAULT_HISTORY_TIMEOUT_MS: u64 = 500;

// ============================================
// Classification & recommendation
// ============================================

/// Absolute temperature (°C) treated as a hardware-safety condition
pub const CRITICAL_TEMPERATURE_C: f64 = 85.0;

/// |z| against the training profile for a feature to count as deviating
pub const FEATURE_DEVIATION_Z: f64 = 3.0;

/// Share of rising steps across the window that makes a trend
pub const TREND_RISING_RATIO: f64 = 0.7;

/// History entries above which a trend-analysis step is suggested
pub const TREND_HISTORY_MIN: usize = 5;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Default data directory: `<local data dir>/iot-sentinel`
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get a value from environment or use default
pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get a boolean flag from environment ("false"/"0" disable)
pub fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(default)
}
