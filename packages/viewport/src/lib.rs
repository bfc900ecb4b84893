#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map viewport integration.
//!
//! The mapping library is abstracted as a [`MapCapability`]. A
//! [`MapViewportAdapter`] owns the engine's collaborators (boundaries,
//! temperatures, facilities) and drives one [`MapSession`] per mounted
//! map: initialization, styling, click handling, recentering, and
//! teardown.

pub mod adapter;
pub mod capability;
pub mod session;
pub mod style;

use heat_map_geometry::GeometryError;
use thiserror::Error;

pub use adapter::{EventOutcome, MapViewportAdapter};
pub use capability::{
    LayerId, ListenerId, MapCapability, MapEvent, MapEventKind, OSM_TILES, TileSource,
};
pub use session::{MapSession, SessionStatus};
pub use style::{PolygonStyle, zone_style, zoom_percentage};

/// Errors from map session initialization.
#[derive(Debug, Error)]
pub enum ViewportError {
    /// Zone boundaries could not be loaded. The session stays failed.
    #[error("Failed to load zone boundaries: {0}")]
    Geometry(#[from] GeometryError),

    /// The session was torn down before initialization finished.
    #[error("Map session was closed during initialization")]
    Cancelled,

    /// The session was already initialized or closed.
    #[error("Map session cannot be initialized in state {status}")]
    InvalidState {
        /// Status at the time of the call.
        status: String,
    },
}
