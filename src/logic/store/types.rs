use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub device_type: Option<String>,
    pub fw_version: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl DeviceInfo {
    pub fn new(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            ..Default::default()
        }
    }
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_devices: u64,
    pub alerts_24h: u64,
    /// Unacknowledged, any age
    pub alerts_active: u64,
    /// Alerts raised by the model in the last 24h
    pub anomalies_24h: u64,
    pub telemetry_24h: u64,
    /// tx + rx bytes reported since midnight UTC
    pub data_volume_today_bytes: u64,
}
