#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Health facility types shared by the facility providers and the zone
//! selection state.

use heat_map_zone_models::LngLat;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A health facility near a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// Provider-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address, if known.
    pub address: Option<String>,
    /// Distance from the selected zone in kilometres, if known.
    pub distance_km: Option<f64>,
    /// Facility position, if known.
    pub location: Option<LngLat>,
    /// Typical cost of a consultation in Philippine pesos, if known.
    pub typical_cost_php: Option<f64>,
}

/// Consultation budget filter applied to displayed facilities.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum BudgetFilter {
    /// No filtering.
    #[default]
    #[serde(rename = "any")]
    #[strum(serialize = "any")]
    Any,
    /// Below ₱500.
    #[serde(rename = "under500")]
    #[strum(serialize = "under500")]
    Under500,
    /// ₱500 up to ₱1,000.
    #[serde(rename = "500-1000")]
    #[strum(serialize = "500-1000")]
    From500To1000,
    /// ₱1,000 up to ₱2,500.
    #[serde(rename = "1000-2500")]
    #[strum(serialize = "1000-2500")]
    From1000To2500,
    /// ₱2,500 and above.
    #[serde(rename = "2500plus")]
    #[strum(serialize = "2500plus")]
    Over2500,
}

impl BudgetFilter {
    /// Returns all filters in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Any,
            Self::Under500,
            Self::From500To1000,
            Self::From1000To2500,
            Self::Over2500,
        ]
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Any => "Any budget",
            Self::Under500 => "Under ₱500",
            Self::From500To1000 => "₱500 – ₱1,000",
            Self::From1000To2500 => "₱1,000 – ₱2,500",
            Self::Over2500 => "₱2,500+",
        }
    }

    /// Cost range as `[lower, upper)` in PHP.
    #[must_use]
    pub const fn range_php(self) -> (f64, f64) {
        match self {
            Self::Any => (f64::NEG_INFINITY, f64::INFINITY),
            Self::Under500 => (f64::NEG_INFINITY, 500.0),
            Self::From500To1000 => (500.0, 1000.0),
            Self::From1000To2500 => (1000.0, 2500.0),
            Self::Over2500 => (2500.0, f64::INFINITY),
        }
    }

    /// Whether a facility with `typical_cost_php` passes the filter.
    ///
    /// Facilities without a known cost always pass.
    #[must_use]
    pub fn admits(self, typical_cost_php: Option<f64>) -> bool {
        let Some(cost) = typical_cost_php.filter(|c| c.is_finite()) else {
            return true;
        };
        let (lower, upper) = self.range_php();
        cost >= lower && cost < upper
    }
}
