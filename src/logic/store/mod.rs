//! Store Module - collaborators consumed by the pipeline
//!
//! Traits cho history / device registry / sinks, và SQLite implementation.

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::StoreError;
pub use sqlite::SqliteStore;
pub use traits::{AlertSink, DeviceRegistry, TelemetryHistory, TelemetrySink};
pub use types::{DashboardSummary, DeviceInfo};
