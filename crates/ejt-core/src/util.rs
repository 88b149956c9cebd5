//! Small formatting and parsing helpers shared across crates.

use chrono::{DateTime, NaiveDateTime};

/// Timestamp format the vendor's save endpoint expects: naive local-style
/// ISO with no offset.
pub const VENDOR_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Converts minutes to a human-readable string like `6 h 0 m`.
///
/// Returns `None` for missing or negative input.
pub fn minutes_to_human(minutes: Option<i64>) -> Option<String> {
    let minutes = minutes?;
    if minutes < 0 {
        return None;
    }

    let h = minutes / 60;
    let m = minutes % 60;
    if h > 0 {
        Some(format!("{h} h {m} m"))
    } else {
        Some(format!("{m} m"))
    }
}

/// Parses a vendor timestamp.
///
/// The vendor usually sends naive ISO strings, occasionally with
/// fractional seconds or an offset; offsets are dropped after parsing.
pub fn parse_vendor_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for format in [VENDOR_DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    None
}

/// Formats a timestamp the way the save endpoint expects it.
pub fn format_vendor_datetime(dt: NaiveDateTime) -> String {
    dt.format(VENDOR_DATETIME_FORMAT).to_string()
}
