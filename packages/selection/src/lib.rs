#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone selection and facility lookup sequencing.
//!
//! A click on a zone starts a facility lookup that may complete long
//! after the user has clicked somewhere else. Every selection bumps a
//! [`RequestEpoch`]; responses carry the epoch they were issued under
//! and are dropped unless it is still current. A per-session
//! [`CancellationFlag`] additionally drops everything once the map is
//! torn down.
//!
//! The [`ZoneSelectionController`] itself is synchronous. The async side
//! lives in [`lookup::run_facility_lookup`], which drives a provider and
//! feeds results back through a [`SharedSelection`].

pub mod cancel;
pub mod controller;
pub mod lookup;

pub use cancel::CancellationFlag;
pub use controller::{
    FacilityRequest, FallbackRequest, LookupOutcome, RequestEpoch, SelectionState, ZoneSelection,
    ZoneSelectionController,
};
pub use lookup::{SharedSelection, lock_selection, run_facility_lookup, shared};
