//! Telemetry Feature Extraction
//!
//! TelemetryReading / JSON payload -> FeatureVector (7 values).
//! Pure functions: missing values become 0.0, byte counters go through log1p.

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use ndarray::Array2;
use serde_json::Value;

use super::layout::*;
use super::vector::FeatureVector;
use crate::logic::telemetry::{payload, TelemetryReading};

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Anything that can fill a feature vector
pub trait FeatureExtractor {
    fn extract(&self, vector: &mut FeatureVector);
}

/// Extract a fresh vector from any source
pub fn extract<S: FeatureExtractor + ?Sized>(source: &S) -> FeatureVector {
    let mut vector = FeatureVector::new();
    source.extract(&mut vector);
    vector
}

/// Stack per-reading vectors in input order -> (n, FEATURE_COUNT)
pub fn extract_many(readings: &[TelemetryReading]) -> Array2<f64> {
    let mut matrix = Array2::zeros((readings.len(), FEATURE_COUNT));
    for (mut row, reading) in matrix.rows_mut().into_iter().zip(readings) {
        let vector = extract(reading);
        for (cell, value) in row.iter_mut().zip(vector.values) {
            *cell = value;
        }
    }
    matrix
}

/// Hour / 23 and weekday (Mon=0) / 6, in the timestamp's own offset
pub fn time_features<Tz: TimeZone>(ts: &DateTime<Tz>) -> (f64, f64) {
    let hour = ts.hour() as f64 / 23.0;
    let weekday = ts.weekday().num_days_from_monday() as f64 / 6.0;
    (hour, weekday)
}

// ============================================================================
// RECORD-SHAPED INPUT
// ============================================================================

impl FeatureExtractor for TelemetryReading {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[IDX_TEMPERATURE] = self.temperature.unwrap_or(0.0);
        vector.values[IDX_HUMIDITY] = self.humidity.unwrap_or(0.0);
        vector.values[IDX_TX] = (self.tx_bytes as f64).ln_1p();
        vector.values[IDX_RX] = (self.rx_bytes as f64).ln_1p();
        vector.values[IDX_CONNECTIONS] = self.connections as f64;

        // Null timestamp on a stored record -> no time signal
        let (hour, weekday) = self.ts.as_ref().map(time_features).unwrap_or((0.0, 0.0));
        vector.values[IDX_HOUR] = hour;
        vector.values[IDX_WEEKDAY] = weekday;
    }
}

// ============================================================================
// DICT-SHAPED INPUT (real-time payload)
// ============================================================================

impl FeatureExtractor for Value {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[IDX_TEMPERATURE] = payload::number(self, "temperature");
        vector.values[IDX_HUMIDITY] = payload::number(self, "humidity");
        vector.values[IDX_TX] = payload::number(self, "tx_bytes").max(0.0).ln_1p();
        vector.values[IDX_RX] = payload::number(self, "rx_bytes").max(0.0).ln_1p();
        vector.values[IDX_CONNECTIONS] = payload::number(self, "connections");

        // Missing timestamp on a live payload -> "now"
        let (hour, weekday) = match payload::timestamp(self) {
            None => time_features(&payload::now()),
            Some(Ok(ts)) => time_features(&ts),
            Some(Err(e)) => {
                log::debug!("Payload timestamp ignored: {}", e);
                (0.0, 0.0)
            }
        };
        vector.values[IDX_HOUR] = hour;
        vector.values[IDX_WEEKDAY] = weekday;
    }
}

/// Convenience for the real-time path
pub fn extract_payload(payload: &Value) -> FeatureVector {
    extract(payload)
}
