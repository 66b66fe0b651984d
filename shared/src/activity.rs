//! Activity records as returned by the activity service.
//!
//! Records are opaque JSON objects. Only the effective timestamp is
//! interpreted here; every other field is carried through untouched and
//! re-emitted in its original order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields consulted for the effective timestamp, in precedence order.
pub const TIMESTAMP_FIELDS: [&str; 2] = ["timestamp", "createdAt"];

/// Wall-clock formats without an offset. These are read in the caller's
/// timezone rather than UTC.
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// An activity record passed through from upstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityRecord(Map<String, Value>);

impl ActivityRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The value the effective timestamp is read from.
    ///
    /// `timestamp` wins over `createdAt`. A field that is present but empty
    /// (`null`, `""`, `0` or `false`) counts as missing.
    pub fn raw_timestamp(&self) -> Option<&Value> {
        TIMESTAMP_FIELDS
            .iter()
            .filter_map(|field| self.0.get(*field))
            .find(|value| is_truthy(value))
    }

    /// Resolve the effective timestamp into `tz`.
    ///
    /// Returns `None` when neither field is usable or the value does not
    /// parse; such a record belongs to no day.
    pub fn occurred_at<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        parse_timestamp(self.raw_timestamp()?, tz)
    }
}

impl From<Map<String, Value>> for ActivityRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Parse a JSON timestamp value.
///
/// Accepted shapes:
///   - RFC 3339 string (`2024-03-15T10:00:00Z`, `...+02:00`)
///   - ISO date-time without offset, read as wall-clock time in `tz`
///   - ISO date (`2024-03-15`), read as midnight UTC
///   - number of milliseconds since the Unix epoch
pub fn parse_timestamp<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<DateTime<Tz>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim(), tz),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(tz))
        }
        _ => None,
    }
}

fn parse_timestamp_str<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(tz));
    }

    for fmt in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            // Nonexistent local times (DST gap) resolve to nothing.
            return tz.from_local_datetime(&naive).earliest();
        }
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).with_timezone(tz))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
