//! Telemetry Reading Types
//!
//! One periodic sample from a sensor/actuator device, as delivered by ingestion.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// TELEMETRY READING
// ============================================================================

/// A typed telemetry record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub device_id: String,
    /// Sample time (None = unknown, time features become 0)
    #[serde(default)]
    pub ts: Option<DateTime<Utc>>,

    // Sensors
    #[serde(default)]
    pub temperature: Option<f64>, // °C
    #[serde(default)]
    pub humidity: Option<f64>, // %
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub motion: Option<bool>,

    // Actuators
    #[serde(default)]
    pub actuator_state: Option<String>,
    #[serde(default)]
    pub led_states: Option<BTreeMap<String, bool>>,

    // Network
    #[serde(default)]
    pub tx_bytes: u64,
    #[serde(default)]
    pub rx_bytes: u64,
    #[serde(default)]
    pub connections: u32,
}

impl TelemetryReading {
    pub fn new(device_id: &str, ts: DateTime<Utc>) -> Self {
        Self {
            device_id: device_id.to_string(),
            ts: Some(ts),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    pub fn with_humidity(mut self, percent: f64) -> Self {
        self.humidity = Some(percent);
        self
    }

    pub fn with_network(mut self, tx_bytes: u64, rx_bytes: u64, connections: u32) -> Self {
        self.tx_bytes = tx_bytes;
        self.rx_bytes = rx_bytes;
        self.connections = connections;
        self
    }

    /// Numeric metric by name, used by rate-of-change diagnostics
    pub fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "temperature" => self.temperature,
            "humidity" => self.humidity,
            "distance" => self.distance,
            "connections" => Some(self.connections as f64),
            "tx_bytes" => Some(self.tx_bytes as f64),
            "rx_bytes" => Some(self.rx_bytes as f64),
            _ => None,
        }
    }

    /// Compact snapshot attached to alerts
    pub fn summary(&self) -> TelemetrySummary {
        TelemetrySummary {
            temperature: self.temperature,
            humidity: self.humidity,
            tx_bytes: self.tx_bytes,
            rx_bytes: self.rx_bytes,
            connections: self.connections,
        }
    }
}

// ============================================================================
// TELEMETRY SUMMARY
// ============================================================================

/// Values from the triggering reading, copied into alert metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySummary {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub connections: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_builder() {
        let reading = TelemetryReading::new("esp32-001", Utc::now())
            .with_temperature(23.5)
            .with_network(1200, 800, 3);

        assert_eq!(reading.metric("temperature"), Some(23.5));
        assert_eq!(reading.metric("humidity"), None);
        assert_eq!(reading.metric("connections"), Some(3.0));
        assert_eq!(reading.metric("nonexistent"), None);
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let reading: TelemetryReading =
            serde_json::from_str(r#"{"device_id":"dht22-001","humidity":61.0}"#).unwrap();

        assert_eq!(reading.device_id, "dht22-001");
        assert!(reading.ts.is_none());
        assert_eq!(reading.humidity, Some(61.0));
        assert_eq!(reading.tx_bytes, 0);
    }
}
