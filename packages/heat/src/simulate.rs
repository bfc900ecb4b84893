//! Deterministic temperature simulation.
//!
//! Used when the backend is unreachable or reports nothing usable. Zones
//! near the city center run hotter, with a small per-zone perturbation so
//! neighbouring zones don't render as one flat block. The same zones,
//! center, and range always produce the same temperatures.

use std::collections::BTreeMap;

use heat_map_zone_models::{LngLat, ZoneFeature, ZoneId};

/// Degrees of longitude treated as one unit of distance from the center.
const LNG_SCALE: f64 = 0.2;
/// Degrees of latitude treated as one unit of distance from the center.
const LAT_SCALE: f64 = 0.15;
/// How quickly temperatures fall off with distance.
const FALLOFF: f64 = 0.4;

/// Simulates a temperature for every zone with a usable ring.
///
/// Zones with fewer than three vertices are skipped. The perturbation is
/// keyed on the zone's position in `zones`, so callers must pass zones in
/// load order. Results are rounded to one decimal and lie in
/// `[min, max]`.
#[must_use]
pub fn simulate(zones: &[ZoneFeature], center: LngLat, min: f64, max: f64) -> BTreeMap<ZoneId, f64> {
    let mut temperatures = BTreeMap::new();

    for (i, zone) in zones.iter().enumerate() {
        let Some(centroid) = zone.known_centroid() else {
            continue;
        };
        #[allow(clippy::cast_precision_loss)]
        let celsius = simulate_one(i as f64, centroid, center, min, max);
        temperatures.insert(zone.id.clone(), celsius);
    }

    log::debug!(
        "Simulated {} of {} zone temperatures",
        temperatures.len(),
        zones.len()
    );

    temperatures
}

fn simulate_one(i: f64, centroid: LngLat, center: LngLat, min: f64, max: f64) -> f64 {
    let dx = (centroid.lng - center.lng) / LNG_SCALE;
    let dy = (centroid.lat - center.lat) / LAT_SCALE;
    let dist = dx.hypot(dy);
    let noise = (i * 1.3).sin().mul_add(0.06, 0.88) + (centroid.lat * 8.0).cos() * 0.04;
    let warmth = 1.0 - (dist * FALLOFF).min(1.0);
    let celsius = round1((max - min).mul_add(warmth * noise, min));

    celsius.max(min).min(max)
}

/// Rounds half up to one decimal place.
#[allow(clippy::suboptimal_flops)]
fn round1(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAVAO: LngLat = LngLat::new(125.4553, 7.1907);

    fn zone(id: &str, lng: f64, lat: f64) -> ZoneFeature {
        let ring = vec![
            LngLat::new(lng - 0.01, lat - 0.01),
            LngLat::new(lng + 0.01, lat - 0.01),
            LngLat::new(lng + 0.01, lat + 0.01),
            LngLat::new(lng - 0.01, lat + 0.01),
            LngLat::new(lng - 0.01, lat - 0.01),
        ];
        ZoneFeature {
            id: ZoneId::from(id),
            name: id.to_string(),
            polygon_ring: ring,
            centroid: LngLat::new(lng, lat),
            geometry: serde_json::Value::Null,
        }
    }

    fn sample_zones() -> Vec<ZoneFeature> {
        vec![
            zone("center", 125.4553, 7.1907),
            zone("near", 125.50, 7.20),
            zone("far", 126.5, 8.0),
        ]
    }

    #[test]
    fn is_deterministic() {
        let zones = sample_zones();
        assert_eq!(
            simulate(&zones, DAVAO, 26.0, 39.0),
            simulate(&zones, DAVAO, 26.0, 39.0)
        );
    }

    #[test]
    fn stays_in_range_and_finite() {
        let temps = simulate(&sample_zones(), DAVAO, 26.0, 39.0);
        assert_eq!(temps.len(), 3);
        for t in temps.values() {
            assert!(t.is_finite());
            assert!((26.0..=39.0).contains(t), "{t} out of range");
        }
    }

    #[test]
    fn center_is_hotter_than_outskirts() {
        let temps = simulate(&sample_zones(), DAVAO, 26.0, 39.0);
        assert!(temps[&ZoneId::from("center")] > temps[&ZoneId::from("far")]);
        assert_eq!(temps[&ZoneId::from("far")], 26.0);
    }

    #[test]
    fn rounds_to_one_decimal() {
        for t in simulate(&sample_zones(), DAVAO, 26.0, 39.0).values() {
            assert!((t * 10.0 - (t * 10.0).round()).abs() < 1e-9, "{t}");
        }
        assert_eq!(round1(31.25), 31.3);
        assert_eq!(round1(-0.05), 0.0);
        assert_eq!(round1(26.04), 26.0);
    }

    #[test]
    fn skips_degenerate_rings_but_keeps_positions() {
        let mut zones = sample_zones();
        zones[0].polygon_ring.truncate(2);
        let temps = simulate(&zones, DAVAO, 26.0, 39.0);
        assert!(!temps.contains_key(&ZoneId::from("center")));

        let full = simulate(&sample_zones(), DAVAO, 26.0, 39.0);
        assert_eq!(temps[&ZoneId::from("near")], full[&ZoneId::from("near")]);
    }

    #[test]
    fn collapsed_range_yields_that_value() {
        for t in simulate(&sample_zones(), DAVAO, 30.0, 30.0).values() {
            assert_eq!(*t, 30.0);
        }
    }
}
