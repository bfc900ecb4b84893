#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Heat risk level table and temperature dataset types.
//!
//! The risk table follows the PAGASA heat index categories and is fixed
//! at compile time. Datasets are rebuilt on every map load and never
//! persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use heat_map_zone_models::{LngLat, ZoneId};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Heat risk level for a temperature, from 1 (not hazardous) to 5
/// (extreme danger).
///
/// Levels are ordered by severity and their ranges cover every finite
/// temperature without gaps or overlaps.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatRiskLevel {
    /// Level 1: below 27 °C
    NotHazardous = 1,
    /// Level 2: 27 °C up to 33 °C
    Caution = 2,
    /// Level 3: 33 °C up to 42 °C
    ExtremeCaution = 3,
    /// Level 4: 42 °C up to 52 °C
    Danger = 4,
    /// Level 5: 52 °C and above
    ExtremeDanger = 5,
}

impl HeatRiskLevel {
    /// Returns all levels in ascending severity.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::NotHazardous,
            Self::Caution,
            Self::ExtremeCaution,
            Self::Danger,
            Self::ExtremeDanger,
        ]
    }

    /// Numeric severity (1-5), also shown to users as the risk score.
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotHazardous => "Not Hazardous",
            Self::Caution => "Caution",
            Self::ExtremeCaution => "Extreme Caution",
            Self::Danger => "Danger",
            Self::ExtremeDanger => "Extreme Danger",
        }
    }

    /// Fill color as `#rrggbb`.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::NotHazardous => "#48bb78",
            Self::Caution => "#ecc94b",
            Self::ExtremeCaution => "#ed8936",
            Self::Danger => "#f97316",
            Self::ExtremeDanger => "#dc2626",
        }
    }

    /// Inclusive lower bound in °C.
    #[must_use]
    pub const fn lower_bound_c(self) -> f64 {
        match self {
            Self::NotHazardous => f64::NEG_INFINITY,
            Self::Caution => 27.0,
            Self::ExtremeCaution => 33.0,
            Self::Danger => 42.0,
            Self::ExtremeDanger => 52.0,
        }
    }

    /// Exclusive upper bound in °C.
    #[must_use]
    pub const fn upper_bound_c(self) -> f64 {
        match self {
            Self::NotHazardous => 27.0,
            Self::Caution => 33.0,
            Self::ExtremeCaution => 42.0,
            Self::Danger => 52.0,
            Self::ExtremeDanger => f64::INFINITY,
        }
    }

    /// Legend text for the level's range.
    #[must_use]
    pub const fn range_label(self) -> &'static str {
        match self {
            Self::NotHazardous => "< 27°C",
            Self::Caution => "27–32°C",
            Self::ExtremeCaution => "33–41°C",
            Self::Danger => "42–51°C",
            Self::ExtremeDanger => "≥ 52°C",
        }
    }

    /// Whether `celsius` falls within `[lower, upper)`.
    #[must_use]
    pub fn contains(self, celsius: f64) -> bool {
        celsius >= self.lower_bound_c() && celsius < self.upper_bound_c()
    }
}

/// Where a dataset's temperatures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TemperatureSource {
    /// Reported by the temperature backend.
    Backend,
    /// Generated deterministically from zone centroids.
    Simulated,
}

/// One zone's temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSample {
    /// Zone the sample belongs to.
    pub zone_id: ZoneId,
    /// Temperature in °C; always finite.
    pub celsius: f64,
}

/// Reconciled per-zone temperatures plus the display range.
///
/// `by_zone` holds original values; use [`TemperatureDataset::display_celsius`]
/// for values clamped into `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureDataset {
    /// Temperature per zone. Zones without data are absent.
    pub by_zone: BTreeMap<ZoneId, f64>,
    /// Lower end of the display range.
    pub min: f64,
    /// Upper end of the display range.
    pub max: f64,
    /// Origin of the temperatures.
    pub source: TemperatureSource,
    /// City-wide average reported by the backend.
    pub average_celsius: Option<f64>,
    /// When the backend last refreshed its data.
    pub updated_at: Option<DateTime<Utc>>,
}

impl TemperatureDataset {
    /// Original (unclamped) temperature of a zone.
    #[must_use]
    pub fn celsius(&self, zone_id: &ZoneId) -> Option<f64> {
        self.by_zone.get(zone_id).copied()
    }

    /// Temperature of a zone clamped into the display range.
    #[must_use]
    pub fn display_celsius(&self, zone_id: &ZoneId) -> Option<f64> {
        self.celsius(zone_id).map(|t| t.max(self.min).min(self.max))
    }

    /// Samples in zone id order.
    #[must_use]
    pub fn samples(&self) -> Vec<TemperatureSample> {
        self.by_zone
            .iter()
            .map(|(zone_id, &celsius)| TemperatureSample {
                zone_id: zone_id.clone(),
                celsius,
            })
            .collect()
    }
}

/// A weighted point for a heat layer, placed at a zone centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    /// Zone centroid.
    pub position: LngLat,
    /// Temperature clamped into the display range.
    pub celsius: f64,
    /// Normalized intensity in `[0, 1]`.
    pub intensity: f64,
}

/// Result of probing the temperature backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Whether any probe endpoint answered successfully.
    pub ok: bool,
    /// Last failure description when `ok` is false.
    pub error: Option<String>,
}
