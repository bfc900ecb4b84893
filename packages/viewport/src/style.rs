//! Zone polygon styling and the zoom indicator.

use heat_map_heat::color_of;
use heat_map_heat_models::TemperatureDataset;
use heat_map_zone_models::ZoneFeature;
use serde::Serialize;

/// Fill opacity of zones with a temperature.
pub const DATA_FILL_OPACITY: f64 = 0.38;

/// Lowest zoom level shown on the zoom indicator.
pub const INDICATOR_MIN_ZOOM: f64 = 1.0;

/// Zoom level shown as 100% on the zoom indicator.
pub const INDICATOR_MAX_ZOOM: f64 = 12.0;

/// Style of one zone polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonStyle {
    /// Fill color.
    pub fill_color: &'static str,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f64,
    /// Outline color.
    pub color: &'static str,
    /// Outline width in pixels.
    pub weight: f64,
}

/// Style for zones without a temperature.
pub const NO_DATA_STYLE: PolygonStyle = PolygonStyle {
    fill_color: "#e2e8f0",
    fill_opacity: 0.3,
    color: "rgba(26, 54, 93, 0.3)",
    weight: 1.0,
};

/// Style of `zone` under `dataset`.
///
/// Colored by the risk of the unclamped temperature.
#[must_use]
pub fn zone_style(zone: &ZoneFeature, dataset: &TemperatureDataset) -> PolygonStyle {
    dataset
        .celsius(&zone.id)
        .map_or(NO_DATA_STYLE, |celsius| PolygonStyle {
            fill_color: color_of(Some(celsius)),
            fill_opacity: DATA_FILL_OPACITY,
            color: "rgba(26, 54, 93, 0.4)",
            weight: 1.0,
        })
}

/// Zoom level as a 0-100 indicator value.
#[must_use]
pub fn zoom_percentage(zoom: f64) -> u8 {
    let ratio = (zoom - INDICATOR_MIN_ZOOM) / (INDICATOR_MAX_ZOOM - INDICATOR_MIN_ZOOM);
    let percent = (ratio * 100.0).round();
    if percent.is_nan() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = percent.clamp(0.0, 100.0) as u8;
    percent
}
