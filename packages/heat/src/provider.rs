//! Temperature backend client.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET /api/heat/{city}/barangay-temperatures` for per-zone readings
//! - `GET /api/heat/{city}/current`, falling back to
//!   `GET /api/heat/{city}/average`, as a reachability probe

use async_trait::async_trait;
use heat_map_city::ApiConfig;
use heat_map_heat_models::BackendStatus;

use crate::HeatError;
use crate::normalize::{TemperatureReport, normalize_report};

/// Source of per-zone temperature readings.
#[async_trait]
pub trait TemperatureProvider: Send + Sync {
    /// Fetches the latest readings for a city.
    ///
    /// # Errors
    ///
    /// Returns [`HeatError`] if the backend is unreachable, answers with
    /// a failure status, or returns an unrecognized body.
    async fn fetch(&self, city_id: &str) -> Result<TemperatureReport, HeatError>;
}

/// Fetches readings from the heat map backend over HTTP.
pub struct HttpTemperatureProvider {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpTemperatureProvider {
    /// Creates a provider for the configured backend.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: ApiConfig) -> Self {
        Self { client, config }
    }

    /// Probes the backend, trying the current reading first and then the
    /// average.
    pub async fn ping_backend(&self, city_id: &str) -> BackendStatus {
        if !self.config.is_remote() {
            return BackendStatus {
                ok: false,
                error: Some("No backend URL configured".to_string()),
            };
        }

        let mut last_error = None;
        for kind in ["current", "average"] {
            let url = self.config.endpoint(&format!("/api/heat/{city_id}/{kind}"));
            match self.client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return BackendStatus {
                        ok: true,
                        error: None,
                    };
                }
                Ok(resp) => last_error = Some(format!("{url} returned {}", resp.status())),
                Err(e) => last_error = Some(format!("{url} failed: {e}")),
            }
        }

        log::warn!(
            "Temperature backend unreachable: {}",
            last_error.as_deref().unwrap_or("unknown error")
        );
        BackendStatus {
            ok: false,
            error: last_error,
        }
    }
}

#[async_trait]
impl TemperatureProvider for HttpTemperatureProvider {
    async fn fetch(&self, city_id: &str) -> Result<TemperatureReport, HeatError> {
        if !self.config.is_remote() {
            return Err(HeatError::Unavailable {
                message: "No backend URL configured".to_string(),
            });
        }

        let url = self
            .config
            .endpoint(&format!("/api/heat/{city_id}/barangay-temperatures"));
        log::info!("Fetching zone temperatures from {url}");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(HeatError::Unavailable {
                message: format!("Temperature request failed with status {}", resp.status()),
            });
        }

        let body: serde_json::Value = serde_json::from_str(&resp.text().await?)?;
        let report = normalize_report(&body)?;
        log::info!(
            "Backend reported {} zone temperatures",
            report.temperatures.len()
        );
        Ok(report)
    }
}
