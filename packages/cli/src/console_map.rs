//! A [`MapCapability`] that narrates map operations to the log.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use heat_map_viewport::{
    LayerId, ListenerId, MapCapability, MapEventKind, PolygonStyle, TileSource,
};
use heat_map_zone_models::{Bounds, LngLat, ZoneFeature};

/// Headless map used by the `map` command.
#[derive(Default)]
pub struct ConsoleMap {
    next_id: u64,
    layers: BTreeSet<u64>,
    listeners: BTreeMap<u64, MapEventKind>,
    zoom: f64,
}

impl ConsoleMap {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn add_layer(&mut self) -> LayerId {
        let id = self.allocate();
        self.layers.insert(id);
        LayerId(id)
    }
}

#[async_trait]
impl MapCapability for ConsoleMap {
    async fn next_frame(&mut self) {
        tokio::task::yield_now().await;
    }

    fn render_tiles(&mut self, tiles: &TileSource) -> LayerId {
        log::info!("Tiles: {} (max zoom {})", tiles.url_template, tiles.max_zoom);
        self.add_layer()
    }

    fn render_polygons(
        &mut self,
        zones: &[ZoneFeature],
        style: &dyn Fn(&ZoneFeature) -> PolygonStyle,
    ) -> LayerId {
        let mut by_color: BTreeMap<&'static str, usize> = BTreeMap::new();
        for zone in zones {
            *by_color.entry(style(zone).fill_color).or_default() += 1;
        }
        for (color, count) in by_color {
            log::info!("Polygons: {count} zones filled {color}");
        }
        self.add_layer()
    }

    fn add_marker(&mut self, position: LngLat) -> LayerId {
        log::info!("Marker at {:.5}, {:.5}", position.lat, position.lng);
        self.add_layer()
    }

    fn has_layer(&self, layer: LayerId) -> bool {
        self.layers.contains(&layer.0)
    }

    fn remove_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer.0);
    }

    fn set_view(&mut self, center: LngLat, zoom: f64) {
        log::info!("View {:.4}, {:.4} at zoom {zoom}", center.lat, center.lng);
        self.zoom = zoom;
    }

    fn pan_to(&mut self, center: LngLat, zoom: f64) {
        log::info!("Pan to {:.4}, {:.4} at zoom {zoom}", center.lat, center.lng);
        self.zoom = zoom;
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: f64, max_zoom: f64) {
        log::info!(
            "Fit bounds {} (padding {padding}px, max zoom {max_zoom})",
            bounds.to_query()
        );
        self.zoom = max_zoom;
    }

    fn invalidate_size(&mut self) {
        log::debug!("Size invalidated");
    }

    fn on(&mut self, kind: MapEventKind) -> ListenerId {
        let id = self.allocate();
        self.listeners.insert(id, kind);
        ListenerId(id)
    }

    fn off(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener.0);
    }

    fn destroy(&mut self) {
        log::info!(
            "Map destroyed with {} layers and {} listeners left",
            self.layers.len(),
            self.listeners.len()
        );
    }
}
