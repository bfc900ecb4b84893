//! Facility response normalization and ordering.

use std::cmp::Ordering;
use std::sync::LazyLock;

use heat_map_facilities_models::Facility;
use heat_map_zone_models::LngLat;
use regex::Regex;
use serde_json::Value;

/// `"1.5 km"`, `"800 m"`, `"2"` (kilometres).
static DISTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(km|m)?\s*$").expect("valid regex")
});

const COST_FIELDS: &[&str] = &["typicalCostPhp", "typical_cost_php", "cost"];

/// Extracts the facility list from a backend response.
///
/// Accepts `{ "facilities": [...] }` or a bare array. Records without a
/// name are dropped. Distances come from `distanceKm`, else a parseable
/// `distance` string, else the great-circle distance from `origin` when
/// the record has coordinates. The result is sorted by distance.
#[must_use]
pub fn normalize_facilities(body: &Value, origin: Option<LngLat>) -> Vec<Facility> {
    let records = match body {
        Value::Array(records) => records.as_slice(),
        _ => body
            .get("facilities")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
    };

    let mut facilities: Vec<Facility> = records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| normalize_facility(record, i, origin))
        .collect();

    if facilities.len() < records.len() {
        log::debug!(
            "Dropped {} facility records without a name",
            records.len() - facilities.len()
        );
    }

    sort_by_distance(&mut facilities);
    facilities
}

fn normalize_facility(record: &Value, index: usize, origin: Option<LngLat>) -> Option<Facility> {
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();

    let id = match record.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("facility-{index}"),
    };

    let address = record
        .get("address")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let location = location_of(record);

    let distance_km = record
        .get("distanceKm")
        .and_then(Value::as_f64)
        .or_else(|| record.get("distance").and_then(distance_of))
        .filter(|d| d.is_finite() && *d >= 0.0)
        .or_else(|| Some(origin?.distance_km(&location?)));

    let typical_cost_php = COST_FIELDS
        .iter()
        .find_map(|field| record.get(field).and_then(Value::as_f64))
        .filter(|c| c.is_finite());

    Some(Facility {
        id,
        name,
        address,
        distance_km,
        location,
        typical_cost_php,
    })
}

fn location_of(record: &Value) -> Option<LngLat> {
    let lat = record.get("lat").and_then(Value::as_f64)?;
    let lng = record
        .get("lng")
        .or_else(|| record.get("lon"))
        .and_then(Value::as_f64)?;
    Some(LngLat::new(lng, lat)).filter(LngLat::is_valid)
}

fn distance_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_distance_km(s),
        _ => None,
    }
}

/// Parses a human-readable distance such as `"1.5 km"` or `"800 m"`
/// into kilometres. A bare number is read as kilometres.
#[must_use]
pub fn parse_distance_km(raw: &str) -> Option<f64> {
    let caps = DISTANCE_RE.captures(raw)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let is_metres = caps
        .get(2)
        .is_some_and(|unit| unit.as_str().eq_ignore_ascii_case("m"));
    Some(if is_metres { value / 1000.0 } else { value })
}

/// Sorts facilities by ascending distance; unknown distances go last.
///
/// Stable, so equal or unknown distances keep the provider's order.
pub fn sort_by_distance(facilities: &mut [Facility]) {
    facilities.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(facilities: &[Facility]) -> Vec<&str> {
        facilities.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn parses_distance_strings() {
        assert_eq!(parse_distance_km("1.5 km"), Some(1.5));
        assert_eq!(parse_distance_km("2KM"), Some(2.0));
        assert_eq!(parse_distance_km("800 m"), Some(0.8));
        assert_eq!(parse_distance_km(" 3 "), Some(3.0));
        assert_eq!(parse_distance_km("Closest"), None);
        assert_eq!(parse_distance_km("-1 km"), None);
    }

    #[test]
    fn string_distances_in_records_do_not_panic() {
        let body = serde_json::json!({"facilities": [
            {"id": "1", "name": "Clinic", "distance": "1.5 km"},
            {"id": "2", "name": "Annex", "distance": "1 KM"}
        ]});
        let facilities = normalize_facilities(&body, None);
        assert_eq!(facilities[0].distance_km, Some(1.0));
        assert_eq!(facilities[1].distance_km, Some(1.5));
    }

    #[test]
    fn orders_by_distance_with_unknown_last() {
        let body = serde_json::json!({"facilities": [
            {"id": "far", "name": "Far", "distanceKm": 5.0},
            {"id": "unknown-1", "name": "Unknown 1"},
            {"id": "near", "name": "Near", "distance": "800 m"},
            {"id": "unknown-2", "name": "Unknown 2", "distance": "Closest"},
            {"id": "mid", "name": "Mid", "distance": 2}
        ]});
        let facilities = normalize_facilities(&body, None);
        assert_eq!(
            ids(&facilities),
            ["near", "mid", "far", "unknown-1", "unknown-2"]
        );
    }

    #[test]
    fn equal_distances_keep_provider_order() {
        let body = serde_json::json!([
            {"id": "b", "name": "B", "distanceKm": 1.0},
            {"id": "a", "name": "A", "distanceKm": 1.0}
        ]);
        assert_eq!(ids(&normalize_facilities(&body, None)), ["b", "a"]);
    }

    #[test]
    fn computes_distance_from_coordinates() {
        let body = serde_json::json!({"facilities": [
            {"id": 7, "name": "SPMC", "lat": 7.0989, "lng": 125.6196, "cost": 400}
        ]});
        let origin = LngLat::new(125.6128, 7.0731);
        let facilities = normalize_facilities(&body, Some(origin));
        let f = &facilities[0];
        assert_eq!(f.id, "7");
        assert_eq!(f.typical_cost_php, Some(400.0));
        let d = f.distance_km.unwrap();
        assert!(d > 2.5 && d < 3.5, "got {d}");
    }

    #[test]
    fn drops_nameless_records_and_tolerates_garbage() {
        let body = serde_json::json!({"facilities": [{"id": "x"}, {"name": "  "}, {"name": "Kept"}]});
        let facilities = normalize_facilities(&body, None);
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].id, "facility-2");
        assert!(normalize_facilities(&serde_json::json!({"error": "x"}), None).is_empty());
    }
}
