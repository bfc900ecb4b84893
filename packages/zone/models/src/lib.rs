#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone identity, coordinate, and boundary feature types.
//!
//! A zone is a neighborhood-level administrative area (a barangay in the
//! default city) and the unit of heat-risk classification. Every other
//! heat map crate keys its data by [`ZoneId`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable administrative identifier of a zone (e.g. a PSGC code).
///
/// Numeric identifiers from `GeoJSON` are stored in their decimal string
/// form so that `1130700001` and `"1130700001"` key the same zone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Creates a zone id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Converts a raw JSON id (string or number) into a [`ZoneId`].
    ///
    /// Returns `None` for `null`, empty strings, and non-scalar values.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| Self::new(trimmed))
            }
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(|v| v.to_string())
                .or_else(|| n.as_u64().map(|v| v.to_string()))
                .or_else(|| Some(n.to_string()))
                .map(Self),
            _ => None,
        }
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A WGS84 position in `GeoJSON` axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl LngLat {
    /// Creates a position from longitude and latitude.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Whether both components are finite and inside the WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl Bounds {
    /// A square box of `half_span` degrees around `center`.
    #[must_use]
    pub fn around(center: LngLat, half_span: f64) -> Self {
        Self {
            west: center.lng - half_span,
            south: center.lat - half_span,
            east: center.lng + half_span,
            north: center.lat + half_span,
        }
    }

    /// Grows the box to include `point`.
    #[must_use]
    pub fn extend(self, point: LngLat) -> Self {
        Self {
            west: self.west.min(point.lng),
            south: self.south.min(point.lat),
            east: self.east.max(point.lng),
            north: self.north.max(point.lat),
        }
    }

    /// Whether the box has finite, non-inverted extents.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
            && self.west <= self.east
            && self.south <= self.north
    }

    /// Formats the box as `west,south,east,north` for query strings.
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// A zone polygon as loaded from the boundary provider.
///
/// Immutable once created; rebuilt on every map mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneFeature {
    /// Stable administrative id.
    pub id: ZoneId,
    /// Administrative name shown to users and matched by search.
    pub name: String,
    /// Exterior ring used for the centroid and heat point placement.
    pub polygon_ring: Vec<LngLat>,
    /// Unweighted vertex mean of `polygon_ring`.
    pub centroid: LngLat,
    /// Raw `GeoJSON` geometry handed to the mapping library.
    pub geometry: serde_json::Value,
}

impl ZoneFeature {
    /// Whether the ring has enough vertices to describe an area.
    ///
    /// Zones failing this check have no usable centroid.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.polygon_ring.len() >= 3
    }

    /// The centroid, or `None` when the ring is degenerate.
    #[must_use]
    pub fn known_centroid(&self) -> Option<LngLat> {
        self.has_area().then_some(self.centroid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_key_the_same_zone() {
        let numeric = ZoneId::from_json(&serde_json::json!(1_130_700_001_u64)).unwrap();
        let string = ZoneId::from_json(&serde_json::json!("1130700001")).unwrap();
        assert_eq!(numeric, string);
    }

    #[test]
    fn null_and_blank_ids_are_rejected() {
        assert!(ZoneId::from_json(&serde_json::Value::Null).is_none());
        assert!(ZoneId::from_json(&serde_json::json!("  ")).is_none());
        assert!(ZoneId::from_json(&serde_json::json!({"id": 1})).is_none());
    }

    #[test]
    fn validates_wgs84_range() {
        assert!(LngLat::new(125.4553, 7.1907).is_valid());
        assert!(!LngLat::new(181.0, 0.0).is_valid());
        assert!(!LngLat::new(0.0, -90.5).is_valid());
        assert!(!LngLat::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = LngLat::new(0.0, 0.0).distance_km(&LngLat::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn bounds_extend_and_query() {
        let b = Bounds::around(LngLat::new(125.0, 7.0), 0.5).extend(LngLat::new(126.0, 7.0));
        assert!(b.is_valid());
        assert_eq!(b.to_query(), "124.5,6.5,126,7.5");
    }
}
