//! Per-mount map state.

use std::sync::Arc;

use heat_map_geometry::GeometryIndex;
use heat_map_heat_models::TemperatureDataset;
use heat_map_selection::{CancellationFlag, SharedSelection};
use tokio::time::Instant;

use crate::capability::{LayerId, ListenerId, MapCapability};

/// Lifecycle of a [`MapSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Mounted, not yet initialized.
    Initializing,
    /// Zones are rendered and interactive.
    Ready,
    /// Initialization failed; the map shows this message.
    Failed(String),
    /// Torn down.
    Closed,
}

/// Everything owned by one mounted map.
///
/// Created by [`MapViewportAdapter::mount`](crate::MapViewportAdapter::mount)
/// and released by
/// [`MapViewportAdapter::teardown`](crate::MapViewportAdapter::teardown).
pub struct MapSession {
    pub(crate) map: Box<dyn MapCapability>,
    pub(crate) status: SessionStatus,
    pub(crate) cancelled: CancellationFlag,
    pub(crate) selection: SharedSelection,
    pub(crate) tile_layer: Option<LayerId>,
    pub(crate) zone_layer: Option<LayerId>,
    pub(crate) marker: Option<LayerId>,
    pub(crate) listeners: Vec<ListenerId>,
    pub(crate) index: Option<Arc<GeometryIndex>>,
    pub(crate) dataset: Option<Arc<TemperatureDataset>>,
    pub(crate) last_click: Option<Instant>,
    pub(crate) zoom_percentage: u8,
}

impl MapSession {
    pub(crate) fn new(map: Box<dyn MapCapability>) -> Self {
        Self {
            map,
            status: SessionStatus::Initializing,
            cancelled: CancellationFlag::new(),
            selection: heat_map_selection::shared(),
            tile_layer: None,
            zone_layer: None,
            marker: None,
            listeners: Vec::new(),
            index: None,
            dataset: None,
            last_click: None,
            zoom_percentage: 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Whether the session accepts interaction.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready && !self.cancelled.is_cancelled()
    }

    /// The session's cancellation flag.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationFlag {
        &self.cancelled
    }

    /// The zone selection shared with in-flight lookups.
    #[must_use]
    pub fn selection(&self) -> SharedSelection {
        Arc::clone(&self.selection)
    }

    /// Loaded zones, once initialized.
    #[must_use]
    pub fn index(&self) -> Option<&GeometryIndex> {
        self.index.as_deref()
    }

    /// Reconciled temperatures, once initialized.
    #[must_use]
    pub fn dataset(&self) -> Option<&TemperatureDataset> {
        self.dataset.as_deref()
    }

    /// Current zoom indicator value (0-100).
    #[must_use]
    pub const fn zoom_percentage(&self) -> u8 {
        self.zoom_percentage
    }

    /// The location marker, if one is shown.
    #[must_use]
    pub const fn marker(&self) -> Option<LayerId> {
        self.marker
    }
}
