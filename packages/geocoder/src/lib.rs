#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for location search.
//!
//! Converts a free-text place name or address into coordinates. Queries
//! without a comma are biased to the city by appending its geocoding
//! context (e.g. `"Roxas Avenue"` becomes
//! `"Roxas Avenue, Davao City, Philippines"`); only the first result is
//! used.
//!
//! Zone names are matched against the loaded boundaries before a
//! geocoder is ever consulted, so this crate only sees queries that are
//! not zone names.

pub mod nominatim;

use async_trait::async_trait;
use heat_map_zone_models::LngLat;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

/// A geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Resolved position.
    pub position: LngLat,
    /// Canonical name returned by the geocoder.
    pub display_name: Option<String>,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves free text to a position.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocodes `query`, biased to `context` (see [`biased_query`]).
    ///
    /// Returns `Ok(None)` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn geocode(
        &self,
        query: &str,
        context: &str,
    ) -> Result<Option<GeocodedPlace>, GeocodeError>;
}

/// Builds the query actually sent to the geocoder.
///
/// Returns `None` for blank input. Queries that already contain a comma
/// are assumed to carry their own context and are sent as-is.
#[must_use]
pub fn biased_query(query: &str, context: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let context = context.trim();
    if query.contains(',') || context.is_empty() {
        Some(query.to_string())
    } else {
        Some(format!("{query}, {context}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_context_without_comma() {
        assert_eq!(
            biased_query(" Roxas Avenue ", "Davao City, Philippines").as_deref(),
            Some("Roxas Avenue, Davao City, Philippines")
        );
    }

    #[test]
    fn keeps_query_with_comma() {
        assert_eq!(
            biased_query("SM Lanang, Davao", "Davao City, Philippines").as_deref(),
            Some("SM Lanang, Davao")
        );
    }

    #[test]
    fn blank_query_is_none() {
        assert!(biased_query("   ", "Davao City, Philippines").is_none());
    }
}
