//! Best-effort timestamp coercion for heterogeneous spreadsheet cells
//!
//! Every input maps to `Some(timestamp)` or `None`. Nothing here fails:
//! blank, NaN-like and unparseable values are all treated as absent.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use super::table::CellValue;

/// Spreadsheet serial dates count days from this epoch (1900 date system).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial range accepted as a date: 1900-01-01 through 9999-12-31.
const SERIAL_MIN: f64 = 1.0;
const SERIAL_MAX: f64 = 2_958_465.0;

const NAN_LIKE: &[&str] = &["nan", "nat", "null", "none", "n/a", "-", "—"];

/// Date-time layouts tried in order. Slash dates are month-first, falling back
/// to day-first only when the month-first reading is invalid.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d-%m-%Y %I:%M %p",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
    "%d-%b-%Y %I:%M %p",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %b %Y, %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%b %d %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y", "%d-%b-%Y", "%d %b %Y"];

/// Coerce a cell into a timestamp, `None` when absent or unparseable.
pub fn coerce_timestamp(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::Empty => None,
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Number(n) => from_serial(*n),
        CellValue::Text(s) => parse_timestamp_str(s),
    }
}

/// Parse a free-form timestamp string.
///
/// Offsets in RFC 3339 input are kept as wall-clock time; no timezone
/// conversion happens.
pub fn parse_timestamp_str(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() || NAN_LIKE.iter().any(|n| s.eq_ignore_ascii_case(n)) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    s.parse::<f64>().ok().and_then(from_serial)
}

/// Convert a spreadsheet serial date (fractional days) into a timestamp.
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
