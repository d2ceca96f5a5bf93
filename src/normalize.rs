//! Normalization of raw feed attributes into typed observations.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::parser::RawRecord;

/// Feed attribute names for the fields the dashboard uses.
pub mod fields {
    pub const COUNTRY: &str = "Country_Region";
    pub const REGION: &str = "Province_State";
    pub const LATITUDE: &str = "Lat";
    pub const LONGITUDE: &str = "Long_";
    pub const CONFIRMED: &str = "Confirmed";
    pub const DEATHS: &str = "Deaths";
    pub const RECOVERED: &str = "Recovered";
    pub const LAST_UPDATE: &str = "Last_Update";
}

/// Display format for calendar timestamps (`2020-03-12 08:00:00`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A validated location-observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub country: String,
    pub region: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
    pub last_update: DateTime<FixedOffset>,
}

impl ObservationRecord {
    /// `last_update` rendered with [`TIMESTAMP_FORMAT`].
    pub fn last_update_display(&self) -> String {
        self.last_update.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Converts epoch milliseconds to calendar time at `offset`.
///
/// Sub-second precision is truncated toward zero. Returns `None` when the
/// instant is outside chrono's representable range.
pub fn convert_epoch_millis(millis: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let secs = millis / 1000;
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&offset))
}

/// Normalizes every record, preserving feed order.
///
/// Records without a `Last_Update` (or without a country) are dropped. A
/// missing region becomes `""` and missing counts become 0.
pub fn normalize_records(records: &[RawRecord], offset: FixedOffset) -> Vec<ObservationRecord> {
    let observations: Vec<ObservationRecord> = records
        .iter()
        .filter_map(|r| normalize_record(r, offset))
        .collect();

    let dropped = records.len() - observations.len();
    if dropped > 0 {
        debug!(dropped, kept = observations.len(), "Dropped records missing required fields");
    }

    observations
}

/// Normalizes one record, or returns `None` if a required field is absent.
pub fn normalize_record(record: &RawRecord, offset: FixedOffset) -> Option<ObservationRecord> {
    let millis = record.get(fields::LAST_UPDATE).and_then(epoch_millis)?;
    let Some(last_update) = convert_epoch_millis(millis, offset) else {
        warn!(millis, "Last_Update outside representable range; dropping record");
        return None;
    };

    let country = record
        .get_str(fields::COUNTRY)
        .filter(|c| !c.is_empty())?
        .to_string();

    Some(ObservationRecord {
        country,
        region: record.get_str(fields::REGION).unwrap_or_default().to_string(),
        latitude: record.get_f64(fields::LATITUDE),
        longitude: record.get_f64(fields::LONGITUDE),
        confirmed: count(record, fields::CONFIRMED),
        deaths: count(record, fields::DEATHS),
        recovered: count(record, fields::RECOVERED),
        last_update,
    })
}

fn epoch_millis(value: &Value) -> Option<i64> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    value
        .as_f64()
        .filter(|ms| ms.is_finite() && ms.abs() < i64::MAX as f64)
        .map(|ms| ms.trunc() as i64)
}

/// Reads a count attribute. Absent, negative and non-numeric values count as 0.
fn count(record: &RawRecord, key: &str) -> u64 {
    let Some(value) = record.get(key) else {
        return 0;
    };
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(n) if n.is_finite() && n >= 0.0 => n.trunc() as u64,
        _ => 0,
    }
}
