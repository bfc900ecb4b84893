#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location search for the heat map.
//!
//! Resolves where the map should recenter, independently of zone
//! selection:
//!
//! - **Text search** matches loaded zone names first and only then asks
//!   a geocoder.
//! - **Device location** goes through secure-context, capability, and
//!   consent checks before asking the platform for a position.
//!
//! Failures are posted to [`LocationMessages`], which shows one message
//! at a time and clears it after [`MESSAGE_TTL`].

pub mod controller;
pub mod device;
pub mod messages;

use thiserror::Error;

pub use controller::{
    DEVICE_ZOOM, GEOCODE_ZOOM, HitOrigin, LocationHit, LocationSearchController, ZONE_ZOOM,
};
pub use device::{
    CONSENT_MESSAGE, ConsentPrompt, GEOLOCATION_TIMEOUT, GeolocationFailure, GeolocationSource,
};
pub use messages::{LocationMessages, MESSAGE_TTL};

/// Why a location could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    /// Neither a zone name nor the geocoder matched the query.
    #[error("Location not found. Try a barangay name or address in Davao City.")]
    NotFound,
    /// The user or platform denied location access.
    #[error("Location denied. Enable location permission for this site and try again.")]
    PermissionDenied,
    /// The platform could not determine a position.
    #[error(
        "Location unavailable. Turn on Location Services in your device settings, or use the search bar to find a place."
    )]
    PositionUnavailable,
    /// No position within [`GEOLOCATION_TIMEOUT`].
    #[error("Location request timed out. Try again or use the search bar to find a place.")]
    Timeout,
    /// The platform returned coordinates outside the WGS84 range.
    #[error("Invalid location result. Please try again.")]
    InvalidResult,
    /// Any other platform failure.
    #[error("Location unavailable. Try the search bar to find a place on the map.")]
    Unknown,
    /// Location requires HTTPS or localhost.
    #[error("Location is only available on secure connections (HTTPS or localhost).")]
    InsecureContext,
    /// The platform has no geolocation capability.
    #[error("Location is not supported by your browser.")]
    Unsupported,
    /// The user declined the consent prompt.
    #[error("Location consent declined")]
    ConsentDeclined,
}

impl LocationError {
    /// User-facing message, or `None` for outcomes the user chose
    /// themselves.
    #[must_use]
    pub const fn message(self) -> Option<&'static str> {
        Some(match self {
            Self::NotFound => "Location not found. Try a barangay name or address in Davao City.",
            Self::PermissionDenied => {
                "Location denied. Enable location permission for this site and try again."
            }
            Self::PositionUnavailable => {
                "Location unavailable. Turn on Location Services in your device settings, or use the search bar to find a place."
            }
            Self::Timeout => {
                "Location request timed out. Try again or use the search bar to find a place."
            }
            Self::InvalidResult => "Invalid location result. Please try again.",
            Self::Unknown => "Location unavailable. Try the search bar to find a place on the map.",
            Self::InsecureContext => {
                "Location is only available on secure connections (HTTPS or localhost)."
            }
            Self::Unsupported => "Location is not supported by your browser.",
            Self::ConsentDeclined => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    const SHOWN: [LocationError; 8] = [
        LocationError::NotFound,
        LocationError::PermissionDenied,
        LocationError::PositionUnavailable,
        LocationError::Timeout,
        LocationError::InvalidResult,
        LocationError::Unknown,
        LocationError::InsecureContext,
        LocationError::Unsupported,
    ];

    #[test]
    fn shown_errors_have_distinct_messages() {
        let messages: BTreeSet<_> = SHOWN.iter().filter_map(|e| e.message()).collect();
        assert_eq!(messages.len(), SHOWN.len());
    }

    #[test]
    fn display_matches_message() {
        for error in SHOWN {
            assert_eq!(Some(error.to_string().as_str()), error.message());
        }
    }

    #[test]
    fn declined_consent_is_silent() {
        assert!(LocationError::ConsentDeclined.message().is_none());
    }
}
