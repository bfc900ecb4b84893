#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone boundary loading, normalization, and lookup.
//!
//! Fetches a city's zone polygons once per map mount (see [`fetch`]),
//! normalizes each `GeoJSON` feature into a [`ZoneFeature`] with a stable
//! id and centroid (see [`normalize`]), and serves name search and
//! point-in-zone lookups from the resulting [`GeometryIndex`].

pub mod fetch;
pub mod index;
pub mod normalize;

use heat_map_zone_models::ZoneId;
use thiserror::Error;

pub use fetch::{BoundaryProvider, GeojsonUrlProvider, StaticBoundaryProvider};
pub use heat_map_zone_models::ZoneFeature;
pub use index::GeometryIndex;

/// Errors that can occur while loading zone boundaries.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was not a usable feature collection.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// The provider returned no usable zone; the map cannot render.
    #[error("No zone boundaries found")]
    Empty,

    /// Two features share the same administrative id.
    #[error("Duplicate zone id: {0}")]
    DuplicateZoneId(ZoneId),
}
