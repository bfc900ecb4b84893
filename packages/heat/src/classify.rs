//! Temperature → [`HeatRiskLevel`] classification.
//!
//! Pure and deterministic: map style callbacks call this on every
//! redraw.

use heat_map_heat_models::HeatRiskLevel;

/// Classifies a temperature in °C.
///
/// Missing or non-finite input maps to the lowest level. Otherwise the
/// first level whose `[lower, upper)` range contains the value wins, and
/// anything at or above the top level's lower bound is the top level.
#[must_use]
pub fn classify(celsius: Option<f64>) -> HeatRiskLevel {
    let levels = HeatRiskLevel::all();
    let Some(t) = celsius.filter(|t| t.is_finite()) else {
        return levels[0];
    };

    levels
        .iter()
        .copied()
        .find(|level| level.contains(t))
        .unwrap_or(levels[levels.len() - 1])
}

/// Fill color for a temperature.
#[must_use]
pub fn color_of(celsius: Option<f64>) -> &'static str {
    classify(celsius).color()
}
