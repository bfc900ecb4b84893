#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Heat risk classification and temperature reconciliation.
//!
//! Turns whatever the temperature backend returns (or nothing at all)
//! into a [`TemperatureDataset`] covering the loaded zones:
//!
//! 1. **Backend** temperatures, normalized from either wire encoding
//!    (see [`normalize`]).
//! 2. **City average** fill for zones the backend did not report.
//! 3. **Simulation** from zone centroids when the backend fails or has
//!    no usable entry (see [`simulate`]).
//!
//! Classification into [`HeatRiskLevel`]s lives in [`classify`].

pub mod classify;
pub mod intensity;
pub mod normalize;
pub mod provider;
pub mod reconcile;
pub mod simulate;

use thiserror::Error;

pub use classify::{classify, color_of};
pub use heat_map_heat_models::{
    BackendStatus, HeatPoint, HeatRiskLevel, TemperatureDataset, TemperatureSource,
};
pub use intensity::{gradient_color, heat_points, normalize_to_intensity};
pub use normalize::{TemperatureReport, normalize_report};
pub use provider::{HttpTemperatureProvider, TemperatureProvider};
pub use reconcile::{TemperatureReconciler, reconcile_report};

/// Errors from the temperature backend.
///
/// None of these reach callers of [`TemperatureReconciler::reconcile`];
/// they are logged and replaced by simulation.
#[derive(Debug, Error)]
pub enum HeatError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend is not configured or answered without usable data.
    #[error("Temperature data unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}
