//! Boundary providers.
//!
//! A provider returns the raw `GeoJSON` features of a city's zones. The
//! production provider fetches a `FeatureCollection` from a URL; the
//! static provider serves an already-parsed collection.

use async_trait::async_trait;

use crate::GeometryError;

/// Source of raw zone boundary features.
#[async_trait]
pub trait BoundaryProvider: Send + Sync {
    /// Fetches every feature of the city's zone collection.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the request or response parsing fails.
    async fn fetch_features(&self) -> Result<Vec<serde_json::Value>, GeometryError>;
}

/// Fetches a standard `GeoJSON` `FeatureCollection` from a URL.
pub struct GeojsonUrlProvider {
    client: reqwest::Client,
    url: String,
}

impl GeojsonUrlProvider {
    /// Creates a provider for `url`.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl BoundaryProvider for GeojsonUrlProvider {
    async fn fetch_features(&self) -> Result<Vec<serde_json::Value>, GeometryError> {
        log::info!("Fetching zone boundaries from {}", self.url);

        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(GeometryError::Conversion {
                message: format!("Boundary request failed with status {}", resp.status()),
            });
        }
        let body = resp.text().await?;

        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| GeometryError::Conversion {
                message: format!("Failed to parse GeoJSON response: {e}"),
            })?;

        features_of(json)
    }
}

/// Serves a fixed `FeatureCollection`, e.g. one bundled with the app.
pub struct StaticBoundaryProvider {
    collection: serde_json::Value,
}

impl StaticBoundaryProvider {
    /// Wraps a parsed `FeatureCollection`.
    #[must_use]
    pub const fn new(collection: serde_json::Value) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl BoundaryProvider for StaticBoundaryProvider {
    async fn fetch_features(&self) -> Result<Vec<serde_json::Value>, GeometryError> {
        features_of(self.collection.clone())
    }
}

fn features_of(collection: serde_json::Value) -> Result<Vec<serde_json::Value>, GeometryError> {
    match collection {
        serde_json::Value::Object(mut map) => match map.remove("features") {
            Some(serde_json::Value::Array(features)) => Ok(features),
            _ => Err(GeometryError::Conversion {
                message: "No features array in GeoJSON response".to_string(),
            }),
        },
        _ => Err(GeometryError::Conversion {
            message: "GeoJSON response is not an object".to_string(),
        }),
    }
}
