//! Nominatim / OpenStreetMap geocoder client.
//!
//! The public instance allows at most **1 request per second** and
//! requires an identifying `User-Agent`. Both are enforced here.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use heat_map_zone_models::LngLat;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{GeocodeError, GeocodedPlace, Geocoder, biased_query};

/// Public Nominatim search endpoint.
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Identifies the client to Nominatim.
pub const USER_AGENT: &str = "heat-map/0.1 (heat risk map location search)";

/// Minimum spacing between requests to the public instance.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Rate-limited Nominatim client.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    /// Creates a client for the public instance.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, GeocodeError> {
        Self::with_base_url(NOMINATIM_SEARCH_URL)
    }

    /// Creates a client for a self-hosted instance.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            last_request: Mutex::new(None),
        })
    }

    /// Waits until at least [`MIN_REQUEST_INTERVAL`] has passed since the
    /// previous request, then records the new request time.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + MIN_REQUEST_INTERVAL;
            if Instant::now() < ready_at {
                log::debug!("Throttling Nominatim request");
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(
        &self,
        query: &str,
        context: &str,
    ) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let Some(q) = biased_query(query, context) else {
            return Ok(None);
        };

        self.throttle().await;
        log::debug!("Geocoding '{q}'");

        let resp = self
            .client
            .get(&self.base_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("q", q.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "0"),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !resp.status().is_success() {
            log::warn!("Nominatim returned {} for '{q}'", resp.status());
            return Ok(None);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = coordinate(&first["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Nominatim response".to_string(),
    })?;

    let lon = coordinate(&first["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lon in Nominatim response".to_string(),
    })?;

    let position = LngLat::new(lon, lat);
    if !position.is_valid() {
        return Err(GeocodeError::Parse {
            message: format!("Nominatim returned an invalid position {lat},{lon}"),
        });
    }

    Ok(Some(GeocodedPlace {
        position,
        display_name: first["display_name"].as_str().map(String::from),
    }))
}

/// Nominatim encodes coordinates as strings.
fn coordinate(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| value.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "7.0731",
            "lon": "125.6128",
            "display_name": "Roxas Avenue, Poblacion District, Davao City, Philippines"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.position.lat - 7.0731).abs() < 1e-4);
        assert!((result.position.lng - 125.6128).abs() < 1e-4);
        assert!(result.display_name.unwrap().starts_with("Roxas Avenue"));
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_malformed_results() {
        assert!(parse_response(&serde_json::json!({"error": "x"})).is_err());
        assert!(parse_response(&serde_json::json!([{"lat": "7.0"}])).is_err());
        assert!(parse_response(&serde_json::json!([{"lat": "95", "lon": "0"}])).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_spaces_requests() {
        let geocoder = NominatimGeocoder::new().unwrap();
        let start = Instant::now();
        geocoder.throttle().await;
        geocoder.throttle().await;
        geocoder.throttle().await;
        assert!(start.elapsed() >= MIN_REQUEST_INTERVAL * 2);
    }

    #[tokio::test]
    async fn blank_query_skips_request() {
        let geocoder = NominatimGeocoder::with_base_url("http://127.0.0.1:9").unwrap();
        assert!(geocoder.geocode("  ", "Davao City").await.unwrap().is_none());
    }
}
