//! Facility providers.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET /api/health-facilities?barangay=<zone id>&lat=&lng=`
//! - `GET /api/health-facilities?bbox=<w,s,e,n>&limit=&offset=` (paged)
//!
//! Zone lookups fall back to [`MockFacilityProvider`] data when the
//! backend is unconfigured, unreachable, or answers without a
//! `facilities` array.

use async_trait::async_trait;
use heat_map_city::ApiConfig;
use heat_map_facilities_models::Facility;
use heat_map_zone_models::{Bounds, LngLat, ZoneId};

use crate::FacilityError;
use crate::mock::MockFacilityProvider;
use crate::normalize::{normalize_facilities, sort_by_distance};

/// Half-width in degrees of the box searched for nearby facilities.
pub const NEARBY_HALF_SPAN_DEG: f64 = 0.05;

/// Facilities requested per bounding-box page.
pub const NEARBY_PAGE_SIZE: usize = 100;

/// Upper bound on facilities fetched for one nearby lookup.
pub const NEARBY_MAX_RESULTS: usize = 300;

/// Nearby facilities kept after sorting by distance.
pub const NEARBY_DISPLAY_LIMIT: usize = 10;

/// Source of health facilities.
#[async_trait]
pub trait FacilityProvider: Send + Sync {
    /// Facilities associated with a zone, ordered by distance from
    /// `center` when known.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError`] if the lookup fails.
    async fn by_zone(
        &self,
        zone_id: &ZoneId,
        center: Option<LngLat>,
    ) -> Result<Vec<Facility>, FacilityError>;

    /// Nearest facilities around `center`, closest first.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError`] if the lookup fails.
    async fn nearby(&self, center: LngLat) -> Result<Vec<Facility>, FacilityError>;
}

/// Looks facilities up on the heat map backend.
pub struct HttpFacilityProvider {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpFacilityProvider {
    /// Creates a provider for the configured backend.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: ApiConfig) -> Self {
        Self { client, config }
    }

    fn url(&self) -> Result<String, FacilityError> {
        if !self.config.is_remote() {
            return Err(FacilityError::Unavailable {
                message: "No backend URL configured".to_string(),
            });
        }
        Ok(self.config.endpoint("/api/health-facilities"))
    }

    async fn get(
        &self,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, FacilityError> {
        let resp = self.client.get(self.url()?).query(query).send().await?;
        if !resp.status().is_success() {
            return Err(FacilityError::Unavailable {
                message: format!("Facility request failed with status {}", resp.status()),
            });
        }
        Ok(serde_json::from_str(&resp.text().await?)?)
    }
}

#[async_trait]
impl FacilityProvider for HttpFacilityProvider {
    async fn by_zone(
        &self,
        zone_id: &ZoneId,
        center: Option<LngLat>,
    ) -> Result<Vec<Facility>, FacilityError> {
        if !self.config.is_remote() {
            log::debug!("No facility backend configured, using demo facilities for {zone_id}");
            return Ok(MockFacilityProvider::facilities_for(zone_id.as_str()));
        }

        let mut query = vec![("barangay", zone_id.to_string())];
        if let Some(center) = center {
            query.push(("lat", center.lat.to_string()));
            query.push(("lng", center.lng.to_string()));
        }

        let facilities = match self.get(&query).await {
            Ok(body) => facilities_or_demo(&body, zone_id, center),
            Err(e) => {
                log::warn!("Facility lookup for {zone_id} failed, using demo facilities: {e}");
                MockFacilityProvider::facilities_for(zone_id.as_str())
            }
        };
        log::debug!("Zone {zone_id} has {} facilities", facilities.len());
        Ok(facilities)
    }

    async fn nearby(&self, center: LngLat) -> Result<Vec<Facility>, FacilityError> {
        let bbox = Bounds::around(center, NEARBY_HALF_SPAN_DEG).to_query();
        let mut collected = Vec::new();
        let mut offset = 0;

        while offset < NEARBY_MAX_RESULTS {
            let limit = NEARBY_PAGE_SIZE.min(NEARBY_MAX_RESULTS - offset);
            let body = self
                .get(&[
                    ("bbox", bbox.clone()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ])
                .await?;
            let page_len = facility_records(&body).map_or(0, <[serde_json::Value]>::len);
            collected.extend(normalize_facilities(&body, Some(center)));
            offset += page_len;

            if page_len < limit {
                break;
            }
        }

        Ok(nearest(collected, NEARBY_DISPLAY_LIMIT))
    }
}

/// Raw facility records of a response: a bare array or a `facilities`
/// array.
fn facility_records(body: &serde_json::Value) -> Option<&[serde_json::Value]> {
    match body {
        serde_json::Value::Array(records) => Some(records),
        _ => body
            .get("facilities")
            .and_then(serde_json::Value::as_array)
            .map(Vec::as_slice),
    }
}

/// Normalized facilities of a zone response, or the zone's demo
/// facilities when the response carries no facility array.
fn facilities_or_demo(
    body: &serde_json::Value,
    zone_id: &ZoneId,
    center: Option<LngLat>,
) -> Vec<Facility> {
    if facility_records(body).is_none() {
        log::warn!("Facility response for {zone_id} has no facilities array, using demo facilities");
        return MockFacilityProvider::facilities_for(zone_id.as_str());
    }
    normalize_facilities(body, center)
}

/// Sorts by distance and keeps the first `limit` entries.
#[must_use]
pub fn nearest(mut facilities: Vec<Facility>, limit: usize) -> Vec<Facility> {
    sort_by_distance(&mut facilities);
    facilities.truncate(limit);
    facilities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_backend_serves_demo_facilities() {
        let provider = HttpFacilityProvider::new(reqwest::Client::new(), ApiConfig::default());
        let zone_id = ZoneId::from("1130700005");
        assert_eq!(
            provider.by_zone(&zone_id, None).await.unwrap(),
            MockFacilityProvider::facilities_for("1130700005")
        );
        assert!(matches!(
            provider.nearby(LngLat::new(125.6, 7.07)).await,
            Err(FacilityError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_serves_demo_facilities() {
        let provider = HttpFacilityProvider::new(
            reqwest::Client::new(),
            ApiConfig::with_base_url("http://127.0.0.1:9"),
        );
        let zone_id = ZoneId::from("1130700002");
        assert_eq!(
            provider.by_zone(&zone_id, None).await.unwrap(),
            MockFacilityProvider::facilities_for("1130700002")
        );
    }

    #[test]
    fn response_without_facility_array_uses_demo_facilities() {
        let zone_id = ZoneId::from("1130700007");
        let body = serde_json::json!({"facilities": {"error": "not ready"}});
        assert_eq!(
            facilities_or_demo(&body, &zone_id, None),
            MockFacilityProvider::facilities_for("1130700007")
        );

        let empty = serde_json::json!({"facilities": []});
        assert!(facilities_or_demo(&empty, &zone_id, None).is_empty());
    }

    #[test]
    fn page_length_counts_raw_records() {
        let body = serde_json::json!({"facilities": [{"id": "x"}, {"name": "Kept"}]});
        assert_eq!(facility_records(&body).map(<[_]>::len), Some(2));
        assert_eq!(normalize_facilities(&body, None).len(), 1);
        assert!(facility_records(&serde_json::json!({"error": "x"})).is_none());
    }

    #[test]
    fn nearest_keeps_closest() {
        let facility = |id: &str, distance_km: Option<f64>| Facility {
            id: id.to_string(),
            name: id.to_string(),
            address: None,
            distance_km,
            location: None,
            typical_cost_php: None,
        };
        let kept = nearest(
            vec![
                facility("c", Some(3.0)),
                facility("x", None),
                facility("a", Some(1.0)),
                facility("b", Some(2.0)),
            ],
            2,
        );
        let ids: Vec<_> = kept.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
