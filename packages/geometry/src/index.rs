//! In-memory zone index.
//!
//! Built once per map mount from the normalized features. Keeps zones in
//! load order (which decides ties in name search and overlapping
//! polygons), an id lookup table, and an R-tree of zone envelopes for
//! click resolution.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use geo::{Contains, MultiPolygon};
use geojson::GeoJson;
use heat_map_city_models::ZoneFieldMapping;
use heat_map_zone_models::{Bounds, LngLat, ZoneFeature, ZoneId};
use regex::Regex;
use rstar::{AABB, RTree, RTreeObject};

use crate::fetch::BoundaryProvider;
use crate::{GeometryError, normalize};

/// Collapses runs of whitespace in zone names and queries.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A zone polygon stored in the R-tree with its load position.
struct ZoneShape {
    position: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for ZoneShape {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// The loaded zones of one city.
pub struct GeometryIndex {
    zones: Vec<ZoneFeature>,
    positions: BTreeMap<ZoneId, usize>,
    normalized_names: Vec<String>,
    shapes: RTree<ZoneShape>,
}

impl GeometryIndex {
    /// Fetches and indexes the city's zones.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Empty`] if no usable zone is returned,
    /// [`GeometryError::DuplicateZoneId`] if two zones share an id, or the
    /// provider's error if fetching fails.
    pub async fn load(
        provider: &dyn BoundaryProvider,
        fields: &ZoneFieldMapping,
    ) -> Result<Self, GeometryError> {
        let features = provider.fetch_features().await?;
        let index = Self::from_features(&features, fields)?;
        log::info!(
            "Loaded {} zones from {} boundary features",
            index.len(),
            features.len()
        );
        Ok(index)
    }

    /// Indexes raw `GeoJSON` features.
    ///
    /// # Errors
    ///
    /// See [`GeometryIndex::load`].
    pub fn from_features(
        features: &[serde_json::Value],
        fields: &ZoneFieldMapping,
    ) -> Result<Self, GeometryError> {
        Self::from_zones(normalize::normalize_features(features, fields))
    }

    /// Indexes already-normalized zones, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Empty`] for an empty list and
    /// [`GeometryError::DuplicateZoneId`] when ids collide.
    pub fn from_zones(zones: Vec<ZoneFeature>) -> Result<Self, GeometryError> {
        if zones.is_empty() {
            return Err(GeometryError::Empty);
        }

        let mut positions = BTreeMap::new();
        for (position, zone) in zones.iter().enumerate() {
            if positions.insert(zone.id.clone(), position).is_some() {
                return Err(GeometryError::DuplicateZoneId(zone.id.clone()));
            }
        }

        let normalized_names = zones.iter().map(|z| normalize_name(&z.name)).collect();

        let mut shapes = Vec::with_capacity(zones.len());
        for (position, zone) in zones.iter().enumerate() {
            let Some(polygon) = parse_geojson_to_multipolygon(&zone.geometry) else {
                log::warn!("Failed to parse geometry for zone {}", zone.id);
                continue;
            };
            shapes.push(ZoneShape {
                position,
                envelope: compute_envelope(&polygon),
                polygon,
            });
        }

        Ok(Self {
            zones,
            positions,
            normalized_names,
            shapes: RTree::bulk_load(shapes),
        })
    }

    /// All zones in load order.
    #[must_use]
    pub fn zones(&self) -> &[ZoneFeature] {
        &self.zones
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Always `false` for a successfully built index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Looks up a zone by id.
    #[must_use]
    pub fn get(&self, id: &ZoneId) -> Option<&ZoneFeature> {
        self.positions.get(id).map(|&i| &self.zones[i])
    }

    /// Finds a zone by name.
    ///
    /// Case-insensitive. Matches when the normalized name equals the
    /// query or either contains the other. The first zone in load order
    /// wins when several match.
    #[must_use]
    pub fn find_by_name(&self, query: &str) -> Option<&ZoneFeature> {
        let query = normalize_name(query);
        if query.is_empty() {
            return None;
        }

        self.normalized_names
            .iter()
            .position(|name| {
                !name.is_empty()
                    && (*name == query || name.contains(&query) || query.contains(name.as_str()))
            })
            .map(|i| &self.zones[i])
    }

    /// Finds the zone containing `point`.
    ///
    /// Zones normally tile the city without overlap; if they do overlap,
    /// the first in load order wins.
    #[must_use]
    pub fn zone_at(&self, point: LngLat) -> Option<&ZoneFeature> {
        let p = geo::Point::new(point.lng, point.lat);
        let query_env = AABB::from_point([point.lng, point.lat]);

        self.shapes
            .locate_in_envelope_intersecting(&query_env)
            .filter(|shape| shape.polygon.contains(&p))
            .map(|shape| shape.position)
            .min()
            .map(|i| &self.zones[i])
    }

    /// Bounding box of every zone ring, if any ring has vertices.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.zones.iter().flat_map(|z| z.polygon_ring.iter());
        let first = points.next()?;
        let start = Bounds {
            west: first.lng,
            south: first.lat,
            east: first.lng,
            north: first.lat,
        };
        Some(points.fold(start, |b, p| b.extend(*p)))
    }
}

/// Lowercases, collapses whitespace, and trims a name or query.
#[must_use]
pub fn normalize_name(input: &str) -> String {
    WHITESPACE_RE
        .replace_all(&input.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Parse a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn parse_geojson_to_multipolygon(geometry: &serde_json::Value) -> Option<MultiPolygon<f64>> {
    let geojson: GeoJson = geometry.to_string().parse().ok()?;
    if let GeoJson::Geometry(geom) = geojson {
        let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
        match geo_geom {
            geo::Geometry::MultiPolygon(mp) => Some(mp),
            geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
            _ => None,
        }
    } else {
        None
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ZoneFieldMapping {
        ZoneFieldMapping {
            id: vec!["adm4_psgc".to_string()],
            name: vec!["adm4_en".to_string()],
            fallback_name: "Barangay".to_string(),
        }
    }

    fn square_feature(id: &str, name: &str, x: f64, y: f64) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "properties": {"adm4_psgc": id, "adm4_en": name},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]]]
            }
        })
    }

    #[test]
    fn first_zone_in_load_order_wins_name_search() {
        let index = GeometryIndex::from_features(
            &[
                square_feature("1", "Poblacion", 0.0, 0.0),
                square_feature("2", "Poblacion District", 1.0, 0.0),
            ],
            &fields(),
        )
        .unwrap();

        let hit = index.find_by_name("Poblacion").unwrap();
        assert_eq!(hit.id.as_str(), "1");
        assert_eq!(std::ptr::from_ref(hit), std::ptr::from_ref(&index.zones()[0]));
    }

    #[test]
    fn query_substring_of_zone_name_matches() {
        let index =
            GeometryIndex::from_features(&[square_feature("1", "Poblacion District", 0.0, 0.0)], &fields())
                .unwrap();
        assert_eq!(index.find_by_name("poblacion").unwrap().id.as_str(), "1");
    }

    #[test]
    fn zone_name_substring_of_query_matches() {
        let index =
            GeometryIndex::from_features(&[square_feature("1", "Talomo", 0.0, 0.0)], &fields()).unwrap();
        assert_eq!(
            index.find_by_name("  TALOMO   proper ").unwrap().id.as_str(),
            "1"
        );
    }

    #[test]
    fn blank_query_matches_nothing() {
        let index =
            GeometryIndex::from_features(&[square_feature("1", "Talomo", 0.0, 0.0)], &fields()).unwrap();
        assert!(index.find_by_name("   ").is_none());
        assert!(index.find_by_name("Buhangin").is_none());
    }

    #[test]
    fn empty_collection_is_a_load_error() {
        assert!(matches!(
            GeometryIndex::from_features(&[], &fields()),
            Err(GeometryError::Empty)
        ));
    }

    #[test]
    fn duplicate_ids_fail_loudly() {
        let result = GeometryIndex::from_features(
            &[
                square_feature("7", "A", 0.0, 0.0),
                square_feature("7", "B", 1.0, 0.0),
            ],
            &fields(),
        );
        assert!(matches!(result, Err(GeometryError::DuplicateZoneId(id)) if id.as_str() == "7"));
    }

    #[test]
    fn resolves_point_to_containing_zone() {
        let index = GeometryIndex::from_features(
            &[
                square_feature("1", "West", 0.0, 0.0),
                square_feature("2", "East", 1.0, 0.0),
            ],
            &fields(),
        )
        .unwrap();

        assert_eq!(
            index.zone_at(LngLat::new(1.5, 0.5)).unwrap().id.as_str(),
            "2"
        );
        assert!(index.zone_at(LngLat::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn bounds_cover_all_rings() {
        let index = GeometryIndex::from_features(
            &[
                square_feature("1", "West", 0.0, 0.0),
                square_feature("2", "East", 1.0, 0.0),
            ],
            &fields(),
        )
        .unwrap();
        let b = index.bounds().unwrap();
        assert_eq!((b.west, b.south, b.east, b.north), (0.0, 0.0, 2.0, 1.0));
    }

    #[test]
    fn looks_up_by_id() {
        let index =
            GeometryIndex::from_features(&[square_feature("1130700001", "Talomo", 0.0, 0.0)], &fields())
                .unwrap();
        assert_eq!(index.get(&ZoneId::from("1130700001")).unwrap().name, "Talomo");
        assert!(index.get(&ZoneId::from("0")).is_none());
    }
}
