//! Rolling z-score fallback
//!
//! Chỉ dùng khi model chưa sẵn sàng: so sánh nhiệt độ hiện tại với
//! mean/std (population) của W lần đọc gần nhất.

use super::types::ZScore;
use crate::constants;
use crate::logic::config::PipelineConfig;
use crate::logic::features::stats::mean_std;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreSettings {
    /// Readings fetched from history
    pub window: usize,
    /// Usable readings required before the test runs
    pub min_history: usize,
    /// Anomalous when |x - μ| > threshold × σ
    pub threshold: f64,
}

impl Default for ZScoreSettings {
    fn default() -> Self {
        Self {
            window: constants::DEFAULT_HISTORY_WINDOW,
            min_history: constants::DEFAULT_MIN_HISTORY,
            threshold: constants::DEFAULT_ZSCORE_THRESHOLD,
        }
    }
}

impl From<&PipelineConfig> for ZScoreSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            window: config.history_window,
            min_history: config.min_history,
            threshold: config.zscore_threshold,
        }
    }
}

/// Z-score of `value` against `history` (most recent first, at most `window` used).
/// `None` when history is too short or flat.
pub fn evaluate(value: f64, history: &[f64], settings: &ZScoreSettings) -> Option<ZScore> {
    let window = &history[..history.len().min(settings.window)];
    if window.len() < settings.min_history.max(1) {
        return None;
    }

    let (mean, std) = mean_std(window);
    if std <= 0.0 || !std.is_finite() {
        return None;
    }

    Some(ZScore {
        value,
        mean,
        std,
        score: (value - mean).abs() / std,
    })
}

impl ZScore {
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.score > threshold
    }
}
