//! Loose Payload Decoding
//!
//! Real-time payloads arrive as JSON maps, either flat
//! (`{"temperature": .., "tx_bytes": .., "ts": ..}`) or in the nested ingest
//! shape (`{"sensors": {..}, "net": {..}}`). Missing or null fields read as 0.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde_json::Value;

use super::reading::TelemetryReading;

/// Read a numeric field from either the top level or one of the nested groups
pub fn number(payload: &Value, field: &str) -> f64 {
    lookup(payload, field)
        .and_then(as_f64)
        .unwrap_or(0.0)
}

/// Timestamp field
///
/// - missing/null -> `None`
/// - string -> RFC 3339 (`Z` or offset), else naive ISO treated as UTC
/// - number -> Unix seconds
pub fn timestamp(payload: &Value) -> Option<Result<DateTime<FixedOffset>, String>> {
    let raw = payload.get("ts").or_else(|| payload.get("timestamp"))?;

    match raw {
        Value::Null => None,
        Value::String(s) => Some(parse_timestamp(s)),
        Value::Number(n) => Some(
            n.as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| format!("timestamp out of range: {}", n)),
        ),
        other => Some(Err(format!("unsupported timestamp: {}", other))),
    }
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| format!("invalid timestamp: {}", s))
}

pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

/// Typed reading from a loose payload. `device_id` is required.
///
/// Same time rule as `extract_payload`: no timestamp means "now"; an
/// unreadable one leaves `ts` unset (time features 0).
pub fn to_reading(payload: &Value) -> Result<TelemetryReading, String> {
    let device_id = payload
        .get("device_id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| "payload has no device_id".to_string())?;

    let ts = match timestamp(payload) {
        Some(Ok(dt)) => Some(dt.with_timezone(&Utc)),
        Some(Err(e)) => {
            log::debug!("Payload timestamp ignored for {}: {}", device_id, e);
            None
        }
        None => Some(now().with_timezone(&Utc)),
    };

    let count = |field: &str| number(payload, field).max(0.0) as u64;

    Ok(TelemetryReading {
        device_id: device_id.to_string(),
        ts,
        temperature: lookup(payload, "temperature").and_then(as_f64),
        humidity: lookup(payload, "humidity").and_then(as_f64),
        tx_bytes: count("tx_bytes"),
        rx_bytes: count("rx_bytes"),
        connections: count("connections").min(u32::MAX as u64) as u32,
        ..Default::default()
    })
}

fn lookup<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    if let Some(v) = payload.get(field) {
        return Some(v);
    }
    ["sensors", "net"]
        .iter()
        .find_map(|group| payload.get(*group).and_then(|g| g.get(field)))
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
