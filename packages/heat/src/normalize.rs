//! Normalizes temperature backend responses.
//!
//! The backend has shipped two encodings of the per-zone temperatures:
//!
//! ```text
//! { "temperatures": { "<zone id>": 31.2, ... }, "min": 26, "max": 39 }
//! { "temperatures": [ { "id": "<zone id>", "temperature": 31.2 }, ... ] }
//! ```
//!
//! A bare top-level array of records is accepted as well. Entries whose
//! value is missing or not a finite number are dropped here, so every
//! temperature in a [`TemperatureReport`] is finite.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use heat_map_zone_models::ZoneId;
use serde_json::Value;

use crate::HeatError;

const ID_FIELDS: &[&str] = &["id", "zoneId", "zone_id", "adm4_psgc", "psgc"];
const TEMPERATURE_FIELDS: &[&str] = &["temperature", "celsius", "temp", "value"];
const AVERAGE_FIELDS: &[&str] = &["averageCelsius", "average_celsius", "average", "avg"];
const UPDATED_AT_FIELDS: &[&str] = &["updatedAt", "updated_at"];

/// A backend temperature response in canonical form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureReport {
    /// Finite temperature per reported zone.
    pub temperatures: BTreeMap<ZoneId, f64>,
    /// Number of entries dropped for a missing id or value.
    pub dropped: usize,
    /// Reported lower end of the display range.
    pub min: Option<f64>,
    /// Reported upper end of the display range.
    pub max: Option<f64>,
    /// City-wide average used to fill unreported zones.
    pub average_celsius: Option<f64>,
    /// When the backend last refreshed its data.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Converts a backend response body into a [`TemperatureReport`].
///
/// # Errors
///
/// Returns [`HeatError::Unavailable`] if the body is neither an object
/// nor an array, or if its `temperatures` field has another shape.
pub fn normalize_report(body: &Value) -> Result<TemperatureReport, HeatError> {
    let mut report = TemperatureReport::default();

    let temperatures = match body {
        Value::Array(_) => body,
        Value::Object(map) => {
            report.min = map.get("min").and_then(number_of);
            report.max = map.get("max").and_then(number_of);
            report.average_celsius = first_field(body, AVERAGE_FIELDS).and_then(number_of);
            report.updated_at = first_field(body, UPDATED_AT_FIELDS).and_then(timestamp_of);
            map.get("temperatures").unwrap_or(&Value::Null)
        }
        _ => {
            return Err(HeatError::Unavailable {
                message: "Temperature response is not a JSON object".to_string(),
            });
        }
    };

    match temperatures {
        Value::Null => {}
        Value::Object(entries) => {
            for (id, value) in entries {
                let id = ZoneId::from_json(&Value::String(id.clone()));
                report.insert(id, number_of(value));
            }
        }
        Value::Array(records) => {
            for record in records {
                let id = first_field(record, ID_FIELDS).and_then(ZoneId::from_json);
                let value = first_field(record, TEMPERATURE_FIELDS).and_then(number_of);
                report.insert(id, value);
            }
        }
        other => {
            return Err(HeatError::Unavailable {
                message: format!("Unexpected temperatures field: {other}"),
            });
        }
    }

    if report.dropped > 0 {
        log::debug!(
            "Dropped {} temperature entries without a usable id or value",
            report.dropped
        );
    }

    Ok(report)
}

impl TemperatureReport {
    fn insert(&mut self, id: Option<ZoneId>, celsius: Option<f64>) {
        match (id, celsius) {
            (Some(id), Some(celsius)) => {
                self.temperatures.insert(id, celsius);
            }
            _ => self.dropped += 1,
        }
    }
}

fn first_field<'a>(value: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|field| value.get(field).filter(|v| !v.is_null()))
}

/// A finite number from a JSON number or numeric string.
fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn timestamp_of(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| log::warn!("Ignoring unparseable updatedAt '{raw}': {e}"))
        .ok()
}
