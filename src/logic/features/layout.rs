//! Feature Layout
//!
//! Thứ tự 7 features mà model được train. Any change to names or order must
//! bump `FEATURE_VERSION`; persisted models store version + CRC32 of the
//! layout and are refused on mismatch.

use crc32fast::Hasher;
use once_cell::sync::Lazy;

pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// LAYOUT
// ============================================================================

pub const FEATURE_COUNT: usize = 7;

pub const IDX_TEMPERATURE: usize = 0;
pub const IDX_HUMIDITY: usize = 1;
pub const IDX_TX: usize = 2;
pub const IDX_RX: usize = 3;
pub const IDX_CONNECTIONS: usize = 4;
pub const IDX_HOUR: usize = 5;
pub const IDX_WEEKDAY: usize = 6;

/// Names indexed by the `IDX_*` constants
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "temperature",        // °C, 0 when absent
    "humidity",           // %, 0 when absent
    "tx_bytes_log",       // log1p(tx_bytes)
    "rx_bytes_log",       // log1p(rx_bytes)
    "connections",
    "hour_normalized",    // hour / 23
    "weekday_normalized", // weekday (Mon = 0) / 6
];

static LAYOUT_HASH: Lazy<u32> = Lazy::new(|| {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
    }
    hasher.finalize()
});

/// CRC32 over version + names
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|n| *n == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "feature layout v{found_version} ({found_hash:08x}) does not match v{} ({:08x})",
    FEATURE_VERSION,
    layout_hash()
)]
pub struct LayoutMismatchError {
    pub found_version: u8,
    pub found_hash: u32,
}

/// Accept only artifacts built with this exact layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    if version == FEATURE_VERSION && hash == layout_hash() {
        Ok(())
    } else {
        Err(LayoutMismatchError { found_version: version, found_hash: hash })
    }
}
