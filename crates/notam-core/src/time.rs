// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Interpretation of the timestamp encodings used by the NOTAM and weather providers.
//!
//! Every parser here fails soft: an unreadable token becomes [`TimeValue::Unknown`]
//! labelled with the original text, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display format for NOTAM validity times.
pub const NOTICE_TIME_FORMAT: &str = "%b %d %Y, %H:%M";
/// Display format for weather report times (explicit Zulu suffix).
pub const REPORT_TIME_FORMAT: &str = "%b %d %Y, %H:%MZ";

pub const PERM: &str = "PERM";
pub const NOT_AVAILABLE: &str = "N/A";

const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeValue {
    /// A UTC instant.
    Concrete(NaiveDateTime),
    /// No scheduled expiry.
    Permanent,
    Unknown,
}

impl TimeValue {
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            TimeValue::Concrete(dt) => Some(*dt),
            _ => None,
        }
    }
}

/// A comparable time value together with its human label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedTime {
    pub value: TimeValue,
    pub label: String,
}

impl ParsedTime {
    pub fn concrete(dt: NaiveDateTime, format: &str) -> Self {
        Self {
            value: TimeValue::Concrete(dt),
            label: dt.format(format).to_string(),
        }
    }

    pub fn permanent() -> Self {
        Self {
            value: TimeValue::Permanent,
            label: PERM.to_string(),
        }
    }

    /// Absent token.
    pub fn not_available() -> Self {
        Self::unknown(NOT_AVAILABLE)
    }

    /// Unreadable token, kept verbatim for display.
    pub fn unknown(original: &str) -> Self {
        Self {
            value: TimeValue::Unknown,
            label: original.to_string(),
        }
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.value.as_datetime()
    }

    pub fn is_permanent(&self) -> bool {
        self.value == TimeValue::Permanent
    }
}

impl Default for ParsedTime {
    fn default() -> Self {
        Self::not_available()
    }
}

impl std::fmt::Display for ParsedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Parses a CFPS `YYMMDDHHMM` token (UTC) or the `PERM` sentinel.
pub fn parse_cfps_token(token: &str) -> ParsedTime {
    let token = token.trim();
    if token.is_empty() {
        return ParsedTime::not_available();
    }
    if token == PERM {
        return ParsedTime::permanent();
    }
    if token.len() != 10 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return ParsedTime::unknown(token);
    }

    match NaiveDateTime::parse_from_str(token, "%y%m%d%H%M") {
        Ok(dt) => ParsedTime::concrete(dt, NOTICE_TIME_FORMAT),
        Err(_) => ParsedTime::unknown(token),
    }
}

/// Parses an FAA ISO-8601 timestamp (`Z` or offset suffix) or the `PERM` sentinel.
pub fn parse_faa_token(token: &str) -> ParsedTime {
    let token = token.trim();
    if token.is_empty() {
        return ParsedTime::not_available();
    }
    if token.eq_ignore_ascii_case(PERM) {
        return ParsedTime::permanent();
    }

    match parse_iso8601(token) {
        Some(dt) => ParsedTime::concrete(dt, NOTICE_TIME_FORMAT),
        None => ParsedTime::unknown(token),
    }
}

/// FAA timestamp field of any JSON type.
pub fn interpret_faa_value(value: Option<&Value>) -> ParsedTime {
    match value {
        None | Some(Value::Null) => ParsedTime::not_available(),
        Some(Value::String(s)) => parse_faa_token(s),
        Some(Value::Number(n)) => match n.as_f64().and_then(from_epoch) {
            Some(dt) => ParsedTime::concrete(dt, NOTICE_TIME_FORMAT),
            None => ParsedTime::unknown(&n.to_string()),
        },
        Some(other) => ParsedTime::unknown(&other.to_string()),
    }
}

/// Weather report timestamp: epoch seconds/milliseconds (number or digit string) or ISO-8601.
pub fn interpret_report_time(value: Option<&Value>) -> ParsedTime {
    match value {
        None | Some(Value::Null) => ParsedTime::not_available(),
        Some(Value::Number(n)) => match n.as_f64().and_then(from_epoch) {
            Some(dt) => ParsedTime::concrete(dt, REPORT_TIME_FORMAT),
            None => ParsedTime::unknown(&n.to_string()),
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return ParsedTime::not_available();
            }
            if s.bytes().all(|b| b.is_ascii_digit()) {
                if let Some(dt) = s.parse::<f64>().ok().and_then(from_epoch) {
                    return ParsedTime::concrete(dt, REPORT_TIME_FORMAT);
                }
            }
            match parse_iso8601(s) {
                Some(dt) => ParsedTime::concrete(dt, REPORT_TIME_FORMAT),
                None => ParsedTime::unknown(s),
            }
        }
        Some(Value::Array(a)) if a.is_empty() => ParsedTime::not_available(),
        Some(other) => ParsedTime::unknown(&other.to_string()),
    }
}

/// Epoch seconds, or milliseconds when the magnitude exceeds 10^12.
pub fn from_epoch(raw: f64) -> Option<NaiveDateTime> {
    if !raw.is_finite() {
        return None;
    }
    let seconds = if raw.abs() > EPOCH_MILLIS_THRESHOLD {
        raw / 1000.0
    } else {
        raw
    };

    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
}

/// ISO-8601 in the shapes the providers actually send. Offsets are normalized to UTC.
fn parse_iso8601(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let bare = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')).unwrap_or(s);
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(bare, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(bare, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
