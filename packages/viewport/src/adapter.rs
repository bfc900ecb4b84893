//! Drives a [`MapSession`] through its lifecycle.

use std::sync::Arc;
use std::time::Duration;

use heat_map_city::CityDefinition;
use heat_map_facilities::FacilityProvider;
use heat_map_geometry::{BoundaryProvider, GeometryIndex};
use heat_map_heat::TemperatureReconciler;
use heat_map_search::LocationHit;
use heat_map_selection::{LookupOutcome, lock_selection, run_facility_lookup};
use heat_map_zone_models::{Bounds, LngLat, ZoneId};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::ViewportError;
use crate::capability::{MapCapability, MapEvent, MapEventKind, OSM_TILES};
use crate::session::{MapSession, SessionStatus};
use crate::style::{zone_style, zoom_percentage};

/// Minimum spacing between accepted clicks.
pub const CLICK_DEBOUNCE: Duration = Duration::from_millis(120);

/// Padding in pixels when fitting the city's bounds.
pub const FIT_PADDING: f64 = 24.0;

/// Highest zoom used when fitting the city's bounds.
pub const FIT_MAX_ZOOM: f64 = 12.0;

/// Result of [`MapViewportAdapter::handle_event`].
#[derive(Debug)]
pub enum EventOutcome {
    /// The session is not interactive.
    Ignored,
    /// A click arrived within [`CLICK_DEBOUNCE`] of the previous one.
    Debounced,
    /// The click was outside every zone.
    NoZone,
    /// A zone was selected and its facility lookup started.
    Selected {
        /// The selected zone.
        zone_id: ZoneId,
        /// The spawned lookup.
        lookup: JoinHandle<LookupOutcome>,
    },
    /// The zoom indicator changed.
    Zoomed(u8),
    /// The map size was invalidated.
    Resized,
}

/// Bridges the engine onto mounted maps.
pub struct MapViewportAdapter {
    city: CityDefinition,
    boundaries: Arc<dyn BoundaryProvider>,
    temperatures: Arc<TemperatureReconciler>,
    facilities: Arc<dyn FacilityProvider>,
}

impl MapViewportAdapter {
    /// Creates an adapter for `city`.
    #[must_use]
    pub fn new(
        city: CityDefinition,
        boundaries: Arc<dyn BoundaryProvider>,
        temperatures: Arc<TemperatureReconciler>,
        facilities: Arc<dyn FacilityProvider>,
    ) -> Self {
        Self {
            city,
            boundaries,
            temperatures,
            facilities,
        }
    }

    /// The city this adapter renders.
    #[must_use]
    pub const fn city(&self) -> &CityDefinition {
        &self.city
    }

    /// Takes ownership of `map` for a new session.
    #[must_use]
    pub fn mount(&self, map: Box<dyn MapCapability>) -> MapSession {
        log::debug!("Mounting map for {}", self.city.id);
        MapSession::new(map)
    }

    /// Renders the city onto the session's map.
    ///
    /// Waits one frame so the container has its final size, then adds
    /// tiles, sets the initial view, subscribes to events, loads zones,
    /// reconciles temperatures, draws the zone layer, and fits the view
    /// to the zones. Stops without touching the map once the session is
    /// cancelled.
    ///
    /// # Errors
    ///
    /// * [`ViewportError::Geometry`] if zones cannot be loaded; the
    ///   session is left in [`SessionStatus::Failed`].
    /// * [`ViewportError::Cancelled`] if the session was torn down
    ///   meanwhile.
    /// * [`ViewportError::InvalidState`] if the session is not
    ///   initializing.
    pub async fn initialize(&self, session: &mut MapSession) -> Result<(), ViewportError> {
        if session.status != SessionStatus::Initializing {
            return Err(ViewportError::InvalidState {
                status: format!("{:?}", session.status),
            });
        }

        session.map.next_frame().await;
        if session.cancelled.is_cancelled() {
            return Err(ViewportError::Cancelled);
        }

        session.tile_layer = Some(session.map.render_tiles(&OSM_TILES));
        session
            .map
            .set_view(self.city.center, self.city.default_zoom);
        session.zoom_percentage = zoom_percentage(session.map.zoom());
        for kind in [MapEventKind::Click, MapEventKind::ZoomEnd, MapEventKind::Resize] {
            let listener = session.map.on(kind);
            session.listeners.push(listener);
        }

        let index =
            match GeometryIndex::load(self.boundaries.as_ref(), &self.city.boundaries.fields).await
            {
                Ok(index) => Arc::new(index),
                Err(e) => {
                    if session.cancelled.is_cancelled() {
                        return Err(ViewportError::Cancelled);
                    }
                    log::warn!("Failed to load zones for {}: {e}", self.city.id);
                    session.status = SessionStatus::Failed(e.to_string());
                    return Err(e.into());
                }
            };
        if session.cancelled.is_cancelled() {
            return Err(ViewportError::Cancelled);
        }

        let dataset = Arc::new(self.temperatures.reconcile(index.zones()).await);
        if session.cancelled.is_cancelled() {
            return Err(ViewportError::Cancelled);
        }

        session.zone_layer = Some(
            session
                .map
                .render_polygons(index.zones(), &|zone| zone_style(zone, &dataset)),
        );
        if let Some(bounds) = index.bounds().filter(Bounds::is_valid) {
            session.map.fit_bounds(bounds, FIT_PADDING, FIT_MAX_ZOOM);
        }

        log::info!(
            "Map ready with {} zones ({} temperatures)",
            index.len(),
            dataset.source
        );
        session.index = Some(index);
        session.dataset = Some(dataset);
        session.status = SessionStatus::Ready;
        Ok(())
    }

    /// Reacts to a map event.
    ///
    /// Clicks resolve to a zone and start its selection; the facility
    /// lookup runs on a spawned task. Must be called from within a tokio
    /// runtime.
    pub fn handle_event(&self, session: &mut MapSession, event: MapEvent) -> EventOutcome {
        if !session.is_ready() {
            return EventOutcome::Ignored;
        }

        match event {
            MapEvent::Click(point) => self.handle_click(session, point),
            MapEvent::ZoomEnd => {
                session.zoom_percentage = zoom_percentage(session.map.zoom());
                EventOutcome::Zoomed(session.zoom_percentage)
            }
            MapEvent::Resize => {
                session.map.invalidate_size();
                EventOutcome::Resized
            }
        }
    }

    fn handle_click(&self, session: &mut MapSession, point: LngLat) -> EventOutcome {
        let now = Instant::now();
        if session
            .last_click
            .is_some_and(|last| now.duration_since(last) < CLICK_DEBOUNCE)
        {
            return EventOutcome::Debounced;
        }

        let (Some(index), Some(dataset)) = (&session.index, &session.dataset) else {
            return EventOutcome::Ignored;
        };
        let Some(zone) = index.zone_at(point) else {
            return EventOutcome::NoZone;
        };
        session.last_click = Some(now);

        let request = lock_selection(&session.selection).select_zone(zone, None, Some(dataset.as_ref()));
        let lookup = tokio::spawn(run_facility_lookup(
            session.selection(),
            Arc::clone(&self.facilities),
            request,
            session.cancelled.clone(),
        ));

        EventOutcome::Selected {
            zone_id: zone.id.clone(),
            lookup,
        }
    }

    /// Clears the selection, invalidating its lookup.
    pub fn dismiss_selection(&self, session: &MapSession) {
        log::debug!("Dismissing selection in {}", self.city.id);
        lock_selection(&session.selection).dismiss();
    }

    /// Moves the location marker to `hit` and pans there.
    pub fn recenter(&self, session: &mut MapSession, hit: &LocationHit) {
        if !session.is_ready() {
            return;
        }
        log::debug!("Recentering {} on {:?}", self.city.id, hit.position);
        if let Some(marker) = session.marker.take()
            && session.map.has_layer(marker)
        {
            session.map.remove_layer(marker);
        }
        session.marker = Some(session.map.add_marker(hit.position));
        session.map.pan_to(hit.position, hit.zoom);
    }

    /// Releases everything the session owns.
    ///
    /// Cancels in-flight work, dismisses the selection, removes owned
    /// layers that are still present, detaches listeners, and destroys
    /// the map. Calling it again is a no-op.
    pub fn teardown(&self, session: &mut MapSession) {
        if session.status == SessionStatus::Closed {
            return;
        }
        session.cancelled.cancel();
        lock_selection(&session.selection).dismiss();

        for layer in [
            session.marker.take(),
            session.zone_layer.take(),
            session.tile_layer.take(),
        ]
        .into_iter()
        .flatten()
        {
            if session.map.has_layer(layer) {
                session.map.remove_layer(layer);
            }
        }
        for listener in session.listeners.drain(..) {
            session.map.off(listener);
        }
        session.map.destroy();
        session.index = None;
        session.dataset = None;
        session.status = SessionStatus::Closed;
        log::debug!("Tore down map for {}", self.city.id);
    }
}
