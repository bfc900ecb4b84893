//! The mapping library seam.
//!
//! Only the operations the engine needs: tiles, one polygon layer,
//! one marker, view changes, and event subscription. Tile math and
//! projection stay inside the implementation.

use async_trait::async_trait;
use heat_map_zone_models::{Bounds, LngLat, ZoneFeature};

use crate::style::PolygonStyle;

/// Handle to a layer added to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

/// Handle to a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Events the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapEventKind {
    /// Pointer click on the map.
    Click,
    /// A zoom animation finished.
    ZoomEnd,
    /// The map container changed size.
    Resize,
}

/// An event delivered by the mapping library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Click at a geographic position.
    Click(LngLat),
    /// Zoom finished; read the level from [`MapCapability::zoom`].
    ZoomEnd,
    /// Container resized.
    Resize,
}

impl MapEvent {
    /// Kind used when subscribing.
    #[must_use]
    pub const fn kind(&self) -> MapEventKind {
        match self {
            Self::Click(_) => MapEventKind::Click,
            Self::ZoomEnd => MapEventKind::ZoomEnd,
            Self::Resize => MapEventKind::Resize,
        }
    }
}

/// A raster tile source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSource {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders.
    pub url_template: &'static str,
    /// Highest zoom level served.
    pub max_zoom: u8,
}

/// Standard `OpenStreetMap` tiles.
pub const OSM_TILES: TileSource = TileSource {
    url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
    max_zoom: 19,
};

/// An interactive map owned by a single [`MapSession`](crate::MapSession).
///
/// Implementations may panic when asked to remove a layer that does not
/// exist; callers check [`MapCapability::has_layer`] first.
#[async_trait]
pub trait MapCapability: Send {
    /// Resolves after the next rendering frame, once the container has
    /// its final size.
    async fn next_frame(&mut self);

    /// Adds a tile layer.
    fn render_tiles(&mut self, tiles: &TileSource) -> LayerId;

    /// Adds one polygon per zone, styled by `style`.
    fn render_polygons(
        &mut self,
        zones: &[ZoneFeature],
        style: &dyn Fn(&ZoneFeature) -> PolygonStyle,
    ) -> LayerId;

    /// Adds a position marker.
    fn add_marker(&mut self, position: LngLat) -> LayerId;

    /// Whether `layer` is still on the map.
    fn has_layer(&self, layer: LayerId) -> bool;

    /// Removes `layer`.
    fn remove_layer(&mut self, layer: LayerId);

    /// Jumps to `center` at `zoom` without animation.
    fn set_view(&mut self, center: LngLat, zoom: f64);

    /// Animates to `center` at `zoom`.
    fn pan_to(&mut self, center: LngLat, zoom: f64);

    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Fits `bounds` with `padding` pixels, zooming in no further than
    /// `max_zoom`.
    fn fit_bounds(&mut self, bounds: Bounds, padding: f64, max_zoom: f64);

    /// Recomputes the container size after a resize.
    fn invalidate_size(&mut self);

    /// Starts delivering events of `kind`.
    fn on(&mut self, kind: MapEventKind) -> ListenerId;

    /// Stops delivering events for `listener`.
    fn off(&mut self, listener: ListenerId);

    /// Releases the map. No other method is called afterwards.
    fn destroy(&mut self);
}
