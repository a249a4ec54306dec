//! Telemetry Module
//!
//! Kiểu dữ liệu telemetry từ thiết bị IoT (typed record + loose JSON payload).
//!
//! ## Structure
//! - `reading.rs` - TelemetryReading, TelemetrySummary
//! - `payload.rs` - Decoding helpers for real-time JSON payloads

pub mod reading;
pub mod payload;

pub use payload::to_reading;
pub use reading::{TelemetryReading, TelemetrySummary};
