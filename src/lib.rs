//! IoT Sentinel Core - Telemetry anomaly detection & alerting
//!
//! Nhận telemetry từ thiết bị, phát hiện bất thường, tạo alert và recommendation.

pub mod constants;
pub mod logic;
