//! Text search and device location.

use std::sync::Arc;
use std::time::Duration;

use heat_map_geocoder::Geocoder;
use heat_map_geometry::GeometryIndex;
use heat_map_zone_models::{LngLat, ZoneId};

use crate::LocationError;
use crate::device::{CONSENT_MESSAGE, ConsentPrompt, GEOLOCATION_TIMEOUT, GeolocationSource};
use crate::messages::LocationMessages;

/// Zoom after matching a zone name.
pub const ZONE_ZOOM: f64 = 14.0;
/// Zoom after a geocoded match.
pub const GEOCODE_ZOOM: f64 = 15.0;
/// Zoom after locating the device.
pub const DEVICE_ZOOM: f64 = 17.0;

/// What produced a [`LocationHit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitOrigin {
    /// A loaded zone's name matched.
    Zone(ZoneId),
    /// The geocoder matched.
    Geocoded {
        /// Canonical name returned by the geocoder.
        display_name: Option<String>,
    },
    /// The device reported its position.
    Device,
}

/// Where to recenter the map.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationHit {
    /// Marker and view center.
    pub position: LngLat,
    /// Target zoom.
    pub zoom: f64,
    /// Where the position came from.
    pub origin: HitOrigin,
}

/// Resolves search queries and device location into [`LocationHit`]s.
pub struct LocationSearchController {
    geocoder: Option<Arc<dyn Geocoder>>,
    geocode_context: String,
    geolocation: Arc<dyn GeolocationSource>,
    consent: Arc<dyn ConsentPrompt>,
    messages: LocationMessages,
    timeout: Duration,
}

impl LocationSearchController {
    /// Creates a controller.
    ///
    /// `geocode_context` is appended to comma-free queries; `geocoder`
    /// may be `None` to search zone names only.
    #[must_use]
    pub fn new(
        geocoder: Option<Arc<dyn Geocoder>>,
        geocode_context: impl Into<String>,
        geolocation: Arc<dyn GeolocationSource>,
        consent: Arc<dyn ConsentPrompt>,
    ) -> Self {
        Self {
            geocoder,
            geocode_context: geocode_context.into(),
            geolocation,
            consent,
            messages: LocationMessages::new(),
            timeout: GEOLOCATION_TIMEOUT,
        }
    }

    /// Overrides the device position timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Messages posted by failed lookups.
    #[must_use]
    pub const fn messages(&self) -> &LocationMessages {
        &self.messages
    }

    /// Resolves free text: zone names first, then the geocoder.
    ///
    /// A zone whose ring is too small for a centroid falls through to
    /// the geocoder. Blank queries fail without posting a message.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::NotFound`] if nothing matches or the
    /// geocoder fails.
    pub async fn search(
        &self,
        index: &GeometryIndex,
        query: &str,
    ) -> Result<LocationHit, LocationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LocationError::NotFound);
        }

        if let Some(zone) = index.find_by_name(query)
            && let Some(centroid) = zone.known_centroid()
        {
            log::debug!("Search '{query}' matched zone {}", zone.id);
            self.messages.clear();
            return Ok(LocationHit {
                position: centroid,
                zoom: ZONE_ZOOM,
                origin: HitOrigin::Zone(zone.id.clone()),
            });
        }

        match self.geocode(query).await {
            Some(hit) => {
                self.messages.clear();
                Ok(hit)
            }
            None => self.fail(LocationError::NotFound),
        }
    }

    async fn geocode(&self, query: &str) -> Option<LocationHit> {
        let geocoder = self.geocoder.as_ref()?;
        match geocoder.geocode(query, &self.geocode_context).await {
            Ok(Some(place)) => Some(LocationHit {
                position: place.position,
                zoom: GEOCODE_ZOOM,
                origin: HitOrigin::Geocoded {
                    display_name: place.display_name,
                },
            }),
            Ok(None) => {
                log::debug!("Geocoder found nothing for '{query}'");
                None
            }
            Err(e) => {
                log::warn!("Geocoding '{query}' failed: {e}");
                None
            }
        }
    }

    /// Centers on the device's position.
    ///
    /// Checks the secure context and capability, then asks for consent
    /// before requesting a position bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns the [`LocationError`] describing the failure. Every error
    /// except [`LocationError::ConsentDeclined`] is also posted to
    /// [`LocationSearchController::messages`].
    pub async fn use_device_location(&self) -> Result<LocationHit, LocationError> {
        if !self.geolocation.is_secure_context() {
            return self.fail(LocationError::InsecureContext);
        }
        if !self.geolocation.is_supported() {
            return self.fail(LocationError::Unsupported);
        }
        if !self.consent.confirm(CONSENT_MESSAGE) {
            log::debug!("Device location consent declined");
            return Err(LocationError::ConsentDeclined);
        }
        self.messages.clear();

        let position =
            match tokio::time::timeout(self.timeout, self.geolocation.current_position()).await {
                Ok(Ok(position)) => position,
                Ok(Err(failure)) => {
                    log::warn!(
                        "Device location failed with code {}: {}",
                        failure.code,
                        failure.message.as_deref().unwrap_or("no detail")
                    );
                    return self.fail(failure.classify());
                }
                Err(_) => return self.fail(LocationError::Timeout),
            };

        if !position.is_valid() {
            return self.fail(LocationError::InvalidResult);
        }

        Ok(LocationHit {
            position,
            zoom: DEVICE_ZOOM,
            origin: HitOrigin::Device,
        })
    }

    fn fail(&self, error: LocationError) -> Result<LocationHit, LocationError> {
        self.messages.post(error);
        Err(error)
    }
}
