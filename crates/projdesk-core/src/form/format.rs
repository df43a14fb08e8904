//! Display and wire formatting for form values
//!
//! Budget grouping, the fixed day-month-year date format, and the deadline
//! shaping applied to fetched records.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// Date format shown by the deadline widget
pub const DATE_DISPLAY_FORMAT: &str = "%d.%m.%Y";

/// Date format sent to the resource provider
pub const DATE_WIRE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Format a number with its integer part grouped by thousands
///
/// `1234000.0` renders as `1 234 000`. Fractional digits are left as is.
pub fn format_grouped(value: f64) -> String {
    let raw = value.to_string();
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(raw.len() + int_part.len() / 3);
    grouped.push_str(sign);
    let len = int_part.len();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Parse user input that may contain grouping separators
///
/// All whitespace is stripped before parsing. Empty input yields `None`.
pub fn parse_grouped(input: &str) -> Result<Option<f64>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(None);
    }

    let value: f64 = compact
        .parse()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a number", input.trim())))?;
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!("'{}' is not a number", input.trim())));
    }
    Ok(Some(value))
}

/// Read a number from a JSON value, accepting numeric strings
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_grouped(s).ok().flatten(),
        _ => None,
    }
}

/// Encode a number for the wire; whole numbers are sent as integers
pub fn number_to_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Format a date as `DD.MM.YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_DISPLAY_FORMAT).to_string()
}

/// Parse a `DD.MM.YYYY` date typed by the user. Empty input yields `None`.
pub fn parse_date_input(input: &str) -> Result<Option<NaiveDate>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, DATE_DISPLAY_FORMAT)
        .map(Some)
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a date in DD.MM.YYYY format", input)))
}

/// Shape a fetched deadline into the date widget's value
///
/// Accepts RFC 3339 timestamps (the date is taken in the timestamp's own
/// offset), naive date-times, `YYYY-MM-DD` dates and epoch milliseconds.
/// Null, empty and unrecognised values leave the widget empty.
pub fn parse_deadline(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Null => None,
        Value::String(s) => parse_deadline_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        other => {
            warn!(value = %other, "Unsupported deadline value, leaving date empty");
            None
        }
    }
}

fn parse_deadline_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_WIRE_FORMAT) {
        return Some(date);
    }

    warn!(value = raw, "Unrecognised deadline, leaving date empty");
    None
}

/// Encode a deadline for the wire: `YYYY-MM-DD` or `null`
pub fn deadline_to_wire(date: Option<NaiveDate>) -> Value {
    match date {
        Some(date) => Value::String(date.format(DATE_WIRE_FORMAT).to_string()),
        None => Value::Null,
    }
}
