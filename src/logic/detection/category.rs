//! Anomaly categorisation
//!
//! Statistical path: temperature level + shape of the window.
//! Model path: which feature deviates most from the training profile.

use super::types::AnomalyCategory;
use crate::constants::{CRITICAL_TEMPERATURE_C, FEATURE_DEVIATION_Z, TREND_RISING_RATIO};
use crate::logic::features::layout::*;
use crate::logic::model::FeatureProfile;

/// Category for a z-score anomaly. `history` is most recent first.
pub fn classify_statistical(value: f64, history: &[f64]) -> AnomalyCategory {
    if value >= CRITICAL_TEMPERATURE_C {
        return AnomalyCategory::CriticalTemperature;
    }

    // Oldest → newest, ending with the current reading
    let series: Vec<f64> = history.iter().rev().copied().chain(std::iter::once(value)).collect();
    let steps: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    if steps.is_empty() {
        return AnomalyCategory::Unclassified;
    }

    let rising = steps.iter().filter(|d| **d > 0.0).count();
    if rising as f64 >= TREND_RISING_RATIO * steps.len() as f64 {
        return AnomalyCategory::TemperatureTrend;
    }

    let reversals = steps.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
    if steps.len() >= 2 && reversals * 2 >= steps.len() - 1 {
        return AnomalyCategory::TemperatureOscillation;
    }

    AnomalyCategory::Unclassified
}

/// Category for a model anomaly from per-feature deviations
pub fn classify_model(values: &[f64; FEATURE_COUNT], profile: &FeatureProfile) -> AnomalyCategory {
    if values[IDX_TEMPERATURE] >= CRITICAL_TEMPERATURE_C {
        return AnomalyCategory::CriticalTemperature;
    }

    let deviations = profile.deviations(values);
    let deviating = |i: usize| deviations[i].abs() >= FEATURE_DEVIATION_Z;
    let count = (0..FEATURE_COUNT).filter(|&i| deviating(i)).count();

    // Several metrics off at once, or none individually: combined drift
    if count == 0 || count >= 3 {
        return AnomalyCategory::DivergingBehavior;
    }

    let dominant = (0..FEATURE_COUNT)
        .max_by(|&a, &b| deviations[a].abs().total_cmp(&deviations[b].abs()))
        .unwrap_or(IDX_TEMPERATURE);

    match dominant {
        IDX_TEMPERATURE if deviating(IDX_HUMIDITY) => AnomalyCategory::TempHumidityCorrelation,
        IDX_TEMPERATURE => AnomalyCategory::DivergingBehavior,
        IDX_HUMIDITY if deviating(IDX_TEMPERATURE) => AnomalyCategory::TempHumidityCorrelation,
        IDX_HUMIDITY if deviations[IDX_HUMIDITY] > 0.0 => AnomalyCategory::ExcessiveHumidity,
        IDX_HUMIDITY => AnomalyCategory::DivergingBehavior,
        IDX_TX if deviating(IDX_RX) => AnomalyCategory::NetworkSpike,
        IDX_TX => AnomalyCategory::HighTxVolume,
        IDX_RX => AnomalyCategory::NetworkSpike,
        IDX_CONNECTIONS => AnomalyCategory::MultipleConnections,
        _ => AnomalyCategory::ErraticPattern,
    }
}
