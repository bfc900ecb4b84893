#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Health facility lookup.
//!
//! Two lookups back the zone detail panel:
//!
//! - **By zone**: facilities the backend associates with a zone id.
//! - **Nearby**: the nearest facilities around a point, used when a zone
//!   has none of its own.
//!
//! Backend responses are normalized in [`normalize`]; every list handed
//! to callers is ordered by [`sort_by_distance`].

pub mod mock;
pub mod normalize;
pub mod provider;

use thiserror::Error;

pub use heat_map_facilities_models::{BudgetFilter, Facility};
pub use mock::MockFacilityProvider;
pub use normalize::{normalize_facilities, parse_distance_km, sort_by_distance};
pub use provider::{FacilityProvider, HttpFacilityProvider};

/// Errors from facility lookups.
#[derive(Debug, Error)]
pub enum FacilityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend is not configured or returned an unusable response.
    #[error("Facility data unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}
