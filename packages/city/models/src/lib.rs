#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City definition types, deserialized from TOML.
//!
//! A city bundles everything the engine needs to know before any network
//! call: where to center the map, where its zone boundaries live, which
//! `GeoJSON` properties hold the zone id and name, and the fallback
//! temperature display range.

use heat_map_zone_models::LngLat;
use serde::{Deserialize, Serialize};

/// A city the heat map can be mounted for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityDefinition {
    /// Unique identifier used in backend paths (e.g. `"davao"`).
    pub id: String,
    /// Human-readable name (e.g. "Davao City").
    pub name: String,
    /// Suffix appended to free-text geocoding queries to bias results.
    pub geocode_context: String,
    /// Initial map center before boundaries are fitted.
    pub center: LngLat,
    /// Initial zoom level.
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,
    /// Where and how to load zone boundaries.
    pub boundaries: BoundarySource,
    /// Fallback temperature display range.
    #[serde(default)]
    pub temperature: TemperatureDefaults,
}

/// Location and field mapping of the zone boundary collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundarySource {
    /// URL returning a `GeoJSON` `FeatureCollection`.
    pub url: String,
    /// Property names holding the id and name of each zone.
    pub fields: ZoneFieldMapping,
}

/// Which feature properties identify and name a zone.
///
/// Candidates are tried in order; the feature's top-level `id` always
/// takes precedence over `id` properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneFieldMapping {
    /// Property candidates for the stable zone id.
    pub id: Vec<String>,
    /// Property candidates for the zone name.
    pub name: Vec<String>,
    /// Name used when none of the candidates is present.
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,
}

impl Default for ZoneFieldMapping {
    fn default() -> Self {
        Self {
            id: vec!["id".to_string()],
            name: vec!["name".to_string()],
            fallback_name: default_fallback_name(),
        }
    }
}

/// Display range used when the backend does not supply one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TemperatureDefaults {
    /// Lower bound in °C.
    pub default_min: f64,
    /// Upper bound in °C.
    pub default_max: f64,
}

impl Default for TemperatureDefaults {
    fn default() -> Self {
        Self {
            default_min: 26.0,
            default_max: 39.0,
        }
    }
}

const fn default_zoom() -> f64 {
    11.0
}

fn default_fallback_name() -> String {
    "Zone".to_string()
}
