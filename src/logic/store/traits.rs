//! Collaborator interfaces consumed by the pipeline

use super::error::StoreError;
use super::types::DeviceInfo;
use crate::logic::alert::Alert;
use crate::logic::telemetry::TelemetryReading;

/// Per-device temperature history for the z-score fallback
pub trait TelemetryHistory: Send + Sync {
    /// Non-null temperatures, most recent first, at most `limit`
    fn recent_temperatures(&self, device_id: &str, limit: usize) -> Result<Vec<f64>, StoreError>;
}

/// Device metadata lookup; unknown devices are `Ok(None)`
pub trait DeviceRegistry: Send + Sync {
    fn device(&self, device_id: &str) -> Result<Option<DeviceInfo>, StoreError>;
}

pub trait TelemetrySink: Send + Sync {
    fn save_telemetry(&self, reading: &TelemetryReading) -> Result<(), StoreError>;
}

pub trait AlertSink: Send + Sync {
    fn save_alert(&self, alert: &Alert) -> Result<(), StoreError>;
}
