//! SQLite Store - reference implementation of the pipeline collaborators
//!
//! Lưu telemetry, alerts, devices vào một file SQLite (hoặc in-memory cho test).
//! Timestamps are stored as RFC 3339 UTC text with fixed precision so they
//! sort lexicographically.

use std::path::Path;

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::error::StoreError;
use super::traits::{AlertSink, DeviceRegistry, TelemetryHistory, TelemetrySink};
use super::types::{DashboardSummary, DeviceInfo};
use crate::logic::alert::{Alert, Severity};
use crate::logic::telemetry::TelemetryReading;

const SCHEMA_SQL: &str = r#"
-- Devices
CREATE TABLE IF NOT EXISTS devices (
    device_id TEXT PRIMARY KEY,
    name TEXT,
    location TEXT,
    device_type TEXT,
    fw_version TEXT,
    last_seen TEXT
);

-- Telemetry
CREATE TABLE IF NOT EXISTS telemetry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    device_id TEXT NOT NULL,
    ts TEXT,
    temperature REAL,
    humidity REAL,
    distance REAL,
    motion INTEGER,
    actuator_state TEXT,
    led_states TEXT,
    tx_bytes INTEGER NOT NULL DEFAULT 0,
    rx_bytes INTEGER NOT NULL DEFAULT 0,
    connections INTEGER NOT NULL DEFAULT 0,
    received_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_telemetry_device ON telemetry(device_id, id);

-- Alerts
CREATE TABLE IF NOT EXISTS alerts (
    alert_id TEXT PRIMARY KEY,
    device_id TEXT NOT NULL,
    ts TEXT NOT NULL,
    severity TEXT NOT NULL,
    score REAL NOT NULL,
    reason TEXT NOT NULL,
    acknowledged INTEGER NOT NULL DEFAULT 0,
    metric TEXT,
    metadata TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alerts_ts ON alerts(ts);
"#;

const TELEMETRY_COLUMNS: &str = "device_id, ts, temperature, humidity, distance, motion, \
     actuator_state, led_states, tx_bytes, rx_bytes, connections";

const ALERT_COLUMNS: &str = "alert_id, device_id, ts, severity, score, reason, acknowledged, metadata";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self::init(Connection::open(path)?)?;
        log::info!("SQLite store opened at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    // ===== DEVICES =====

    pub fn upsert_device(&self, device: &DeviceInfo) -> Result<(), StoreError> {
        self.conn.lock().execute(
            r#"
            INSERT INTO devices (device_id, name, location, device_type, fw_version, last_seen)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(device_id) DO UPDATE SET
                name = COALESCE(excluded.name, name),
                location = COALESCE(excluded.location, location),
                device_type = COALESCE(excluded.device_type, device_type),
                fw_version = COALESCE(excluded.fw_version, fw_version),
                last_seen = COALESCE(excluded.last_seen, last_seen)
            "#,
            params![
                device.device_id,
                device.name,
                device.location,
                device.device_type,
                device.fw_version,
                device.last_seen.as_ref().map(fmt_ts),
            ],
        )?;
        Ok(())
    }

    pub fn list_devices(&self) -> Result<Vec<DeviceInfo>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT device_id, name, location, device_type, fw_version, last_seen FROM devices ORDER BY device_id",
        )?;
        let rows = stmt.query_map([], device_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ===== TELEMETRY =====

    /// Most recent first; all devices when `device_id` is None
    pub fn recent_telemetry(
        &self,
        device_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TelemetryReading>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {} FROM telemetry WHERE (?1 IS NULL OR device_id = ?1) \
             ORDER BY COALESCE(ts, received_at) DESC, id DESC LIMIT ?2",
            TELEMETRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![device_id, limit as i64], telemetry_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ===== ALERTS =====

    pub fn recent_alerts(&self, limit: usize) -> Result<Vec<Alert>, StoreError> {
        self.query_alerts("1 = 1", limit)
    }

    /// Unacknowledged alerts, most recent first
    pub fn active_alerts(&self, limit: usize) -> Result<Vec<Alert>, StoreError> {
        self.query_alerts("acknowledged = 0", limit)
    }

    pub fn get_alert(&self, alert_id: Uuid) -> Result<Option<Alert>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {} FROM alerts WHERE alert_id = ?1", ALERT_COLUMNS);
        Ok(conn
            .query_row(&sql, params![alert_id.to_string()], alert_from_row)
            .optional()?)
    }

    /// Returns false when the alert does not exist
    pub fn acknowledge_alert(&self, alert_id: Uuid) -> Result<bool, StoreError> {
        let changed = self.conn.lock().execute(
            "UPDATE alerts SET acknowledged = 1 WHERE alert_id = ?1",
            params![alert_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn query_alerts(&self, filter: &str, limit: usize) -> Result<Vec<Alert>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {} FROM alerts WHERE {} ORDER BY ts DESC, rowid DESC LIMIT ?1",
            ALERT_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], alert_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ===== DASHBOARD =====

    pub fn dashboard_summary(&self) -> Result<DashboardSummary, StoreError> {
        let now = Utc::now();
        let day_ago = fmt_ts(&(now - Duration::hours(24)));
        let midnight = fmt_ts(&now.date_naive().and_time(NaiveTime::MIN).and_utc());

        let conn = self.conn.lock();
        let count = |sql: &str, arg: Option<&str>| -> Result<u64, StoreError> {
            let n: i64 = match arg {
                Some(a) => conn.query_row(sql, params![a], |r| r.get(0))?,
                None => conn.query_row(sql, [], |r| r.get(0))?,
            };
            Ok(n.max(0) as u64)
        };

        Ok(DashboardSummary {
            total_devices: count("SELECT COUNT(*) FROM devices", None)?,
            alerts_24h: count("SELECT COUNT(*) FROM alerts WHERE ts >= ?1", Some(day_ago.as_str()))?,
            alerts_active: count("SELECT COUNT(*) FROM alerts WHERE acknowledged = 0", None)?,
            anomalies_24h: count(
                "SELECT COUNT(*) FROM alerts WHERE ts >= ?1 AND metric = 'ml'",
                Some(day_ago.as_str()),
            )?,
            telemetry_24h: count(
                "SELECT COUNT(*) FROM telemetry WHERE COALESCE(ts, received_at) >= ?1",
                Some(day_ago.as_str()),
            )?,
            data_volume_today_bytes: count(
                "SELECT CAST(TOTAL(tx_bytes) + TOTAL(rx_bytes) AS INTEGER) FROM telemetry \
                 WHERE COALESCE(ts, received_at) >= ?1",
                Some(midnight.as_str()),
            )?,
        })
    }
}

/// INTEGER columns are signed; counters past i64::MAX saturate
fn clamp_counter(value: u64) -> i64 {
    value.min(i64::MAX as u64) as i64
}

// ===== COLLABORATOR TRAITS =====

impl TelemetryHistory for SqliteStore {
    fn recent_temperatures(&self, device_id: &str, limit: usize) -> Result<Vec<f64>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT temperature FROM telemetry \
             WHERE device_id = ?1 AND temperature IS NOT NULL \
             ORDER BY COALESCE(ts, received_at) DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![device_id, limit as i64], |r| r.get::<_, f64>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl DeviceRegistry for SqliteStore {
    fn device(&self, device_id: &str) -> Result<Option<DeviceInfo>, StoreError> {
        let conn = self.conn.lock();
        Ok(conn
            .query_row(
                "SELECT device_id, name, location, device_type, fw_version, last_seen \
                 FROM devices WHERE device_id = ?1",
                params![device_id],
                device_from_row,
            )
            .optional()?)
    }
}

impl TelemetrySink for SqliteStore {
    fn save_telemetry(&self, reading: &TelemetryReading) -> Result<(), StoreError> {
        let led_states = reading.led_states.as_ref().map(serde_json::to_string).transpose()?;
        let received_at = fmt_ts(&Utc::now());
        let ts = reading.ts.as_ref().map(fmt_ts);

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO telemetry ({}, received_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                TELEMETRY_COLUMNS
            ),
            params![
                reading.device_id,
                ts,
                reading.temperature,
                reading.humidity,
                reading.distance,
                reading.motion,
                reading.actuator_state,
                led_states,
                clamp_counter(reading.tx_bytes),
                clamp_counter(reading.rx_bytes),
                reading.connections as i64,
                received_at,
            ],
        )?;
        // Readings keep the registry's last_seen current
        tx.execute(
            r#"
            INSERT INTO devices (device_id, last_seen) VALUES (?1, ?2)
            ON CONFLICT(device_id) DO UPDATE SET last_seen = excluded.last_seen
            "#,
            params![reading.device_id, ts.unwrap_or(received_at)],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl AlertSink for SqliteStore {
    fn save_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        let metadata = serde_json::to_string(&alert.metadata)?;
        self.conn.lock().execute(
            &format!(
                "INSERT INTO alerts ({}, metric) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                ALERT_COLUMNS
            ),
            params![
                alert.alert_id.to_string(),
                alert.device_id,
                fmt_ts(&alert.ts),
                alert.severity.as_str(),
                alert.score,
                alert.reason,
                alert.acknowledged,
                metadata,
                alert.metric(),
            ],
        )?;
        Ok(())
    }
}

// ===== ROW MAPPING =====

fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn ts_column(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(text) => DateTime::parse_from_rfc3339(&text)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

fn device_from_row(row: &Row) -> rusqlite::Result<DeviceInfo> {
    Ok(DeviceInfo {
        device_id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        device_type: row.get(3)?,
        fw_version: row.get(4)?,
        last_seen: ts_column(row, 5)?,
    })
}

fn telemetry_from_row(row: &Row) -> rusqlite::Result<TelemetryReading> {
    let led_states = match row.get::<_, Option<String>>(7)? {
        Some(text) => Some(serde_json::from_str(&text).map_err(|e| conversion_error(7, e))?),
        None => None,
    };

    Ok(TelemetryReading {
        device_id: row.get(0)?,
        ts: ts_column(row, 1)?,
        temperature: row.get(2)?,
        humidity: row.get(3)?,
        distance: row.get(4)?,
        motion: row.get(5)?,
        actuator_state: row.get(6)?,
        led_states,
        tx_bytes: row.get::<_, i64>(8)?.max(0) as u64,
        rx_bytes: row.get::<_, i64>(9)?.max(0) as u64,
        connections: row.get::<_, i64>(10)?.clamp(0, u32::MAX as i64) as u32,
    })
}

fn alert_from_row(row: &Row) -> rusqlite::Result<Alert> {
    let alert_id: String = row.get(0)?;
    let severity: String = row.get(3)?;
    let metadata: String = row.get(7)?;

    Ok(Alert {
        alert_id: Uuid::parse_str(&alert_id).map_err(|e| conversion_error(0, e))?,
        device_id: row.get(1)?,
        ts: ts_column(row, 2)?.ok_or(rusqlite::Error::InvalidColumnType(2, "ts".into(), Type::Null))?,
        severity: Severity::parse(&severity).unwrap_or(Severity::High),
        score: row.get(4)?,
        reason: row.get(5)?,
        acknowledged: row.get(6)?,
        metadata: serde_json::from_str(&metadata).map_err(|e| conversion_error(7, e))?,
    })
}
