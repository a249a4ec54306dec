//! Diagnostic statistics over a device's recent readings
//!
//! Not part of the anomaly decision; exposed for dashboards and debugging.
//! Input must already be sorted by timestamp ascending.

use serde::{Deserialize, Serialize};

use crate::logic::telemetry::TelemetryReading;

/// Mean/std of temperature and humidity over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub temp_mean: f64,
    pub temp_std: f64,
    pub hum_mean: f64,
    pub hum_std: f64,
}

/// Rolling stats over the last `window` readings
///
/// Fewer than 2 readings -> all zeros. Per metric, the mean needs one value
/// and the (population) std needs two.
pub fn rolling_stats(readings: &[TelemetryReading], window: usize) -> RollingStats {
    if readings.len() < 2 {
        return RollingStats::default();
    }

    let tail = &readings[readings.len().saturating_sub(window)..];
    let temps: Vec<f64> = tail.iter().filter_map(|r| r.temperature).collect();
    let hums: Vec<f64> = tail.iter().filter_map(|r| r.humidity).collect();

    let (temp_mean, temp_std) = mean_std(&temps);
    let (hum_mean, hum_std) = mean_std(&hums);

    RollingStats { temp_mean, temp_std, hum_mean, hum_std }
}

/// Difference between the last two readings for `metric`
/// (`temperature`, `humidity`, `connections`); 0.0 when not computable
pub fn rate_of_change(readings: &[TelemetryReading], metric: &str) -> f64 {
    if readings.len() < 2 {
        return 0.0;
    }

    let last = &readings[readings.len() - 1];
    let prev = &readings[readings.len() - 2];

    match (last.metric(metric), prev.metric(metric)) {
        (Some(l), Some(p)) => l - p,
        _ => 0.0,
    }
}

/// Population mean/std; (0, 0) for empty input, std 0 for a single value
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
