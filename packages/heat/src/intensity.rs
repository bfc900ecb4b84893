//! Heat layer points and gradient.
//!
//! Optional presentation helpers: a heat layer draws one weighted point
//! per zone centroid, colored along [`HEAT_GRADIENT`].

use heat_map_heat_models::{HeatPoint, TemperatureDataset};
use heat_map_zone_models::ZoneFeature;

/// Color stops from cool to hot as `(position, [r, g, b])`.
pub const HEAT_GRADIENT: [(f64, [u8; 3]); 7] = [
    (0.0, [0x20, 0x6b, 0xcb]),
    (0.2, [0x42, 0x99, 0xe1]),
    (0.4, [0x48, 0xbb, 0x78]),
    (0.55, [0xec, 0xc9, 0x4b]),
    (0.7, [0xed, 0x89, 0x36]),
    (0.85, [0xe5, 0x3e, 0x3e]),
    (1.0, [0x9b, 0x2c, 0x2c]),
];

/// Maps a temperature to `[0, 1]` within the display range.
///
/// A collapsed or non-finite range maps everything to the middle.
#[must_use]
pub fn normalize_to_intensity(celsius: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return 0.5;
    }
    let intensity = (celsius - min) / range;
    if intensity.is_nan() {
        0.5
    } else {
        intensity.clamp(0.0, 1.0)
    }
}

/// One point per zone that has both a centroid and a temperature.
#[must_use]
pub fn heat_points(zones: &[ZoneFeature], dataset: &TemperatureDataset) -> Vec<HeatPoint> {
    zones
        .iter()
        .filter_map(|zone| {
            let position = zone.known_centroid()?;
            let celsius = dataset.display_celsius(&zone.id)?;
            Some(HeatPoint {
                position,
                celsius,
                intensity: normalize_to_intensity(celsius, dataset.min, dataset.max),
            })
        })
        .collect()
}

/// Gradient color at `intensity` as `#rrggbb`, interpolating linearly
/// between the surrounding stops.
#[must_use]
pub fn gradient_color(intensity: f64) -> String {
    let t = if intensity.is_nan() {
        0.5
    } else {
        intensity.clamp(0.0, 1.0)
    };

    let upper = HEAT_GRADIENT
        .iter()
        .position(|(stop, _)| *stop >= t)
        .unwrap_or(HEAT_GRADIENT.len() - 1);
    let lower = upper.saturating_sub(1);

    let (p0, c0) = HEAT_GRADIENT[lower];
    let (p1, c1) = HEAT_GRADIENT[upper];
    let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };

    let channel = |i: usize| -> u8 {
        let a = f64::from(c0[i]);
        let b = f64::from(c1[i]);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = (b - a).mul_add(f, a).round().clamp(0.0, 255.0) as u8;
        v
    };

    format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use heat_map_heat_models::TemperatureSource;
    use heat_map_zone_models::{LngLat, ZoneId};

    use super::*;

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(normalize_to_intensity(26.0, 26.0, 39.0), 0.0);
        assert_eq!(normalize_to_intensity(39.0, 26.0, 39.0), 1.0);
        assert_eq!(normalize_to_intensity(50.0, 26.0, 39.0), 1.0);
        assert_eq!(normalize_to_intensity(10.0, 26.0, 39.0), 0.0);
        assert!((normalize_to_intensity(32.5, 26.0, 39.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_is_midpoint() {
        assert_eq!(normalize_to_intensity(30.0, 30.0, 30.0), 0.5);
        assert_eq!(normalize_to_intensity(30.0, 39.0, 26.0), 0.5);
        assert_eq!(normalize_to_intensity(30.0, f64::NAN, 39.0), 0.5);
        assert_eq!(normalize_to_intensity(f64::NAN, 26.0, 39.0), 0.5);
    }

    #[test]
    fn gradient_hits_stops_exactly() {
        assert_eq!(gradient_color(0.0), "#206bcb");
        assert_eq!(gradient_color(0.4), "#48bb78");
        assert_eq!(gradient_color(1.0), "#9b2c2c");
        assert_eq!(gradient_color(7.0), "#9b2c2c");
        assert_eq!(gradient_color(-1.0), "#206bcb");
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        // Halfway between #206bcb and #4299e1.
        assert_eq!(gradient_color(0.1), "#3182d6");
    }

    #[test]
    fn points_skip_zones_without_data_or_area() {
        let zone = |id: &str, ring_len: usize| ZoneFeature {
            id: ZoneId::from(id),
            name: id.to_string(),
            polygon_ring: vec![LngLat::new(0.0, 0.0); ring_len],
            centroid: LngLat::new(1.0, 1.0),
            geometry: serde_json::Value::Null,
        };
        let zones = vec![zone("hot", 4), zone("flat", 2), zone("unknown", 4)];
        let dataset = TemperatureDataset {
            by_zone: BTreeMap::from([(ZoneId::from("hot"), 45.0), (ZoneId::from("flat"), 30.0)]),
            min: 26.0,
            max: 39.0,
            source: TemperatureSource::Backend,
            average_celsius: None,
            updated_at: None,
        };

        let points = heat_points(&zones, &dataset);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].celsius, 39.0);
        assert_eq!(points[0].intensity, 1.0);
    }
}
