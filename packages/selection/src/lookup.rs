//! Async driver for facility lookups.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heat_map_facilities::FacilityProvider;

use crate::cancel::CancellationFlag;
use crate::controller::{FacilityRequest, LookupOutcome, ZoneSelectionController};

/// Controller shared between the map session and in-flight lookups.
pub type SharedSelection = Arc<Mutex<ZoneSelectionController>>;

/// Wraps a fresh controller for sharing.
#[must_use]
pub fn shared() -> SharedSelection {
    Arc::new(Mutex::new(ZoneSelectionController::new()))
}

/// Locks the controller, recovering from a poisoned lock.
pub fn lock_selection(shared: &SharedSelection) -> MutexGuard<'_, ZoneSelectionController> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `request` against `provider` and applies the results.
///
/// Performs the nearby fallback when the controller asks for one.
/// Nothing is applied once `cancelled` is set; the lock is never held
/// across an await.
pub async fn run_facility_lookup(
    shared: SharedSelection,
    provider: Arc<dyn FacilityProvider>,
    request: FacilityRequest,
    cancelled: CancellationFlag,
) -> LookupOutcome {
    let result = provider.by_zone(&request.zone_id, request.center).await;
    if cancelled.is_cancelled() {
        log::debug!("Session closed, dropping facilities for {}", request.zone_id);
        return LookupOutcome::Discarded;
    }

    let outcome = lock_selection(&shared).apply_facilities(request.epoch, result);
    let LookupOutcome::NeedsFallback(fallback) = outcome else {
        return outcome;
    };

    let result = provider.nearby(fallback.center).await;
    if cancelled.is_cancelled() {
        log::debug!("Session closed, dropping nearby facilities");
        return LookupOutcome::Discarded;
    }

    lock_selection(&shared).apply_fallback(fallback.epoch, result)
}
