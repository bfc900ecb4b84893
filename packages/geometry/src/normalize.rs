//! Normalizes raw `GeoJSON` features into [`ZoneFeature`] values.
//!
//! Uses the city's [`ZoneFieldMapping`] to extract the zone id and name
//! from each feature, regardless of the provider-specific field naming.

use heat_map_city_models::ZoneFieldMapping;
use heat_map_zone_models::{LngLat, ZoneFeature, ZoneId};

/// Normalizes a list of raw `GeoJSON` features into zones.
///
/// Skips features without an id or without geometry. Order is preserved.
#[must_use]
pub fn normalize_features(
    features: &[serde_json::Value],
    fields: &ZoneFieldMapping,
) -> Vec<ZoneFeature> {
    features
        .iter()
        .filter_map(|feature| normalize_feature(feature, fields))
        .collect()
}

/// Normalizes a single `GeoJSON` feature.
#[must_use]
pub fn normalize_feature(
    feature: &serde_json::Value,
    fields: &ZoneFieldMapping,
) -> Option<ZoneFeature> {
    let Some(id) = id_of(feature, fields) else {
        log::warn!("Skipping zone feature without an id");
        return None;
    };

    let geometry = feature.get("geometry").filter(|g| !g.is_null())?.clone();
    let polygon_ring = polygon_ring(&geometry).unwrap_or_default();
    let centroid = centroid_of(&polygon_ring);

    Some(ZoneFeature {
        id,
        name: name_of(feature, fields),
        polygon_ring,
        centroid,
        geometry,
    })
}

/// Stable zone id of a feature.
///
/// The feature's top-level `id` wins; otherwise the configured property
/// candidates are tried in order.
#[must_use]
pub fn id_of(feature: &serde_json::Value, fields: &ZoneFieldMapping) -> Option<ZoneId> {
    if let Some(id) = feature.get("id").and_then(ZoneId::from_json) {
        return Some(id);
    }
    let props = feature.get("properties")?;
    fields
        .id
        .iter()
        .find_map(|field| props.get(field).and_then(ZoneId::from_json))
}

/// Administrative name of a feature, or the mapping's fallback name.
#[must_use]
pub fn name_of(feature: &serde_json::Value, fields: &ZoneFieldMapping) -> String {
    feature
        .get("properties")
        .and_then(|props| {
            fields.name.iter().find_map(|field| {
                props
                    .get(field)
                    .and_then(serde_json::Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            })
        })
        .map_or_else(|| fields.fallback_name.clone(), String::from)
}

/// Exterior ring of a `Polygon`, or of the first polygon of a
/// `MultiPolygon`, as `[lng, lat]` vertices.
///
/// Returns `None` for other geometry types or malformed coordinates.
#[must_use]
pub fn polygon_ring(geometry: &serde_json::Value) -> Option<Vec<LngLat>> {
    let coordinates = geometry.get("coordinates")?;
    let ring = match geometry.get("type")?.as_str()? {
        "Polygon" => coordinates.get(0)?,
        "MultiPolygon" => coordinates.get(0)?.get(0)?,
        _ => return None,
    };

    ring.as_array()?
        .iter()
        .map(|vertex| {
            let lng = vertex.get(0)?.as_f64()?;
            let lat = vertex.get(1)?.as_f64()?;
            Some(LngLat::new(lng, lat))
        })
        .collect()
}

/// Unweighted mean of the ring's vertices, excluding the last one.
///
/// `GeoJSON` rings repeat their first vertex at the end, so the last
/// vertex is always dropped. This is not an area-weighted centroid.
/// An empty or single-vertex ring yields `(0, 0)`.
#[must_use]
pub fn centroid_of(ring: &[LngLat]) -> LngLat {
    let open = &ring[..ring.len().saturating_sub(1)];
    if open.is_empty() {
        return LngLat::new(0.0, 0.0);
    }

    #[allow(clippy::cast_precision_loss)]
    let n = open.len() as f64;
    let (sum_lng, sum_lat) = open
        .iter()
        .fold((0.0, 0.0), |(lng, lat), p| (lng + p.lng, lat + p.lat));
    LngLat::new(sum_lng / n, sum_lat / n)
}
