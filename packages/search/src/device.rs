//! Device geolocation seams.

use std::time::Duration;

use async_trait::async_trait;
use heat_map_zone_models::LngLat;

use crate::LocationError;

/// Upper bound on a single position request.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Shown before the platform is asked for a position.
pub const CONSENT_MESSAGE: &str = "Allow this site to use your location to show it on the map? Your location is not stored or sent to any server.";

/// A platform position error, using the W3C geolocation codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeolocationFailure {
    /// `1` permission denied, `2` position unavailable, `3` timeout.
    pub code: u16,
    /// Platform-provided detail.
    pub message: Option<String>,
}

impl GeolocationFailure {
    /// Maps the platform code onto a [`LocationError`].
    #[must_use]
    pub const fn classify(&self) -> LocationError {
        match self.code {
            1 => LocationError::PermissionDenied,
            2 => LocationError::PositionUnavailable,
            3 => LocationError::Timeout,
            _ => LocationError::Unknown,
        }
    }
}

/// The platform's geolocation capability.
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    /// Whether the page is served over HTTPS or from localhost.
    fn is_secure_context(&self) -> bool;

    /// Whether geolocation exists at all.
    fn is_supported(&self) -> bool;

    /// Requests one high-accuracy position, never from a cache.
    ///
    /// # Errors
    ///
    /// Returns the platform's [`GeolocationFailure`].
    async fn current_position(&self) -> Result<LngLat, GeolocationFailure>;
}

/// Synchronous yes/no confirmation shown to the user.
pub trait ConsentPrompt: Send + Sync {
    /// Shows `message` and returns whether the user agreed.
    fn confirm(&self, message: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: u16) -> GeolocationFailure {
        GeolocationFailure {
            code,
            message: None,
        }
    }

    #[test]
    fn classifies_w3c_codes() {
        assert_eq!(failure(1).classify(), LocationError::PermissionDenied);
        assert_eq!(failure(2).classify(), LocationError::PositionUnavailable);
        assert_eq!(failure(3).classify(), LocationError::Timeout);
        assert_eq!(failure(0).classify(), LocationError::Unknown);
        assert_eq!(failure(99).classify(), LocationError::Unknown);
    }
}
