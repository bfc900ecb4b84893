//! The zone selection state machine.
//!
//! ```text
//! Idle ──select──▶ Loading ──facilities──▶ Resolved
//!   ▲                 │  │                     │
//!   │                 │  └─empty─▶ (fallback) ─┤
//!   │                 └──error──▶ Failed ◀─────┘
//!   └──────dismiss────── any state
//! ```
//!
//! `select_zone` is accepted from every state, including `Loading`.

use heat_map_facilities::{FacilityError, sort_by_distance};
use heat_map_facilities_models::{BudgetFilter, Facility};
use heat_map_heat::classify;
use heat_map_heat_models::{HeatRiskLevel, TemperatureDataset};
use heat_map_zone_models::{LngLat, ZoneFeature, ZoneId};
use serde::Serialize;

/// Monotonic request counter. Starts at 0; the first selection is 1.
pub type RequestEpoch = u64;

/// Lifecycle of the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing selected.
    #[default]
    Idle,
    /// Facilities for `zone_id` are being fetched.
    Loading {
        /// Epoch of the in-flight lookup.
        epoch: RequestEpoch,
        /// Selected zone.
        zone_id: ZoneId,
    },
    /// Facilities arrived (possibly empty).
    Resolved {
        /// Epoch the facilities belong to.
        epoch: RequestEpoch,
        /// Selected zone.
        zone_id: ZoneId,
    },
    /// The lookup failed; the zone stays selected without facilities.
    Failed {
        /// Epoch of the failed lookup.
        epoch: RequestEpoch,
        /// Selected zone.
        zone_id: ZoneId,
    },
}

/// Everything shown for the selected zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSelection {
    /// Selected zone.
    pub zone_id: ZoneId,
    /// Zone name.
    pub name: String,
    /// Unclamped temperature, if the zone has data.
    pub temperature_c: Option<f64>,
    /// Risk level of `temperature_c`.
    pub risk_level: HeatRiskLevel,
    /// Facilities, closest first.
    pub facilities: Vec<Facility>,
    /// Whether `facilities` came from the nearby search instead of the
    /// zone itself.
    pub is_nearby_fallback: bool,
    /// Whether a lookup is still in flight.
    pub facilities_loading: bool,
    /// Point facilities are measured from.
    pub center: Option<LngLat>,
}

impl ZoneSelection {
    /// Facilities passing the budget filter, in display order.
    #[must_use]
    pub fn visible_facilities(&self, filter: BudgetFilter) -> Vec<&Facility> {
        self.facilities
            .iter()
            .filter(|f| filter.admits(f.typical_cost_php))
            .collect()
    }
}

/// Facility lookup issued by [`ZoneSelectionController::select_zone`].
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRequest {
    /// Epoch the response must be applied under.
    pub epoch: RequestEpoch,
    /// Zone to look up.
    pub zone_id: ZoneId,
    /// Zone centroid, if known.
    pub center: Option<LngLat>,
}

/// Nearby lookup requested when a zone has no facilities of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackRequest {
    /// Epoch of the originating selection.
    pub epoch: RequestEpoch,
    /// Point to search around.
    pub center: LngLat,
}

/// What happened to a lookup response.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The response was stale and ignored.
    Discarded,
    /// The zone had no facilities; the caller must run this nearby lookup.
    NeedsFallback(FallbackRequest),
    /// The selection left the loading state.
    Finalized,
}

/// Owns the selection and its request epochs.
#[derive(Debug, Default)]
pub struct ZoneSelectionController {
    epoch: RequestEpoch,
    state: SelectionState,
    selection: Option<ZoneSelection>,
    fallback_pending: bool,
}

impl ZoneSelectionController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current epoch.
    #[must_use]
    pub const fn epoch(&self) -> RequestEpoch {
        self.epoch
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Current selection, if any.
    #[must_use]
    pub const fn selection(&self) -> Option<&ZoneSelection> {
        self.selection.as_ref()
    }

    /// Selects `zone`, invalidating any in-flight lookup.
    ///
    /// Name, temperature, and risk are filled immediately from
    /// `dataset`; facilities start empty. `centroid` overrides the zone's
    /// own centroid, which is used when it is `None`.
    pub fn select_zone(
        &mut self,
        zone: &ZoneFeature,
        centroid: Option<LngLat>,
        dataset: Option<&TemperatureDataset>,
    ) -> FacilityRequest {
        self.epoch += 1;
        let epoch = self.epoch;
        let center = centroid.or_else(|| zone.known_centroid());
        let temperature_c = dataset.and_then(|d| d.celsius(&zone.id));

        log::debug!("Selecting zone {} at epoch {epoch}", zone.id);

        self.fallback_pending = false;
        self.state = SelectionState::Loading {
            epoch,
            zone_id: zone.id.clone(),
        };
        self.selection = Some(ZoneSelection {
            zone_id: zone.id.clone(),
            name: zone.name.clone(),
            temperature_c,
            risk_level: classify(temperature_c),
            facilities: Vec::new(),
            is_nearby_fallback: false,
            facilities_loading: true,
            center,
        });

        FacilityRequest {
            epoch,
            zone_id: zone.id.clone(),
            center,
        }
    }

    /// Applies the zone facility response issued under `epoch`.
    ///
    /// An empty result for a zone with a known center requests exactly
    /// one nearby fallback; the selection stays loading until
    /// [`ZoneSelectionController::apply_fallback`].
    pub fn apply_facilities(
        &mut self,
        epoch: RequestEpoch,
        result: Result<Vec<Facility>, FacilityError>,
    ) -> LookupOutcome {
        if !self.accepts(epoch) || self.fallback_pending {
            log::debug!("Discarding stale facility response for epoch {epoch}");
            return LookupOutcome::Discarded;
        }

        match result {
            Ok(facilities) if facilities.is_empty() => {
                let center = self.selection.as_ref().and_then(|s| s.center);
                if let Some(center) = center {
                    log::info!("Zone has no facilities, searching nearby");
                    self.fallback_pending = true;
                    LookupOutcome::NeedsFallback(FallbackRequest { epoch, center })
                } else {
                    self.resolve(facilities, false);
                    LookupOutcome::Finalized
                }
            }
            Ok(facilities) => {
                self.resolve(facilities, false);
                LookupOutcome::Finalized
            }
            Err(e) => {
                log::warn!("Facility lookup failed: {e}");
                self.fail();
                LookupOutcome::Finalized
            }
        }
    }

    /// Applies the nearby fallback response issued under `epoch`.
    pub fn apply_fallback(
        &mut self,
        epoch: RequestEpoch,
        result: Result<Vec<Facility>, FacilityError>,
    ) -> LookupOutcome {
        if !self.accepts(epoch) || !self.fallback_pending {
            log::debug!("Discarding stale nearby response for epoch {epoch}");
            return LookupOutcome::Discarded;
        }
        self.fallback_pending = false;

        match result {
            Ok(facilities) => {
                let is_nearby_fallback = !facilities.is_empty();
                self.resolve(facilities, is_nearby_fallback);
            }
            Err(e) => {
                log::warn!("Nearby facility lookup failed: {e}");
                self.fail();
            }
        }
        LookupOutcome::Finalized
    }

    /// Clears the selection and invalidates any in-flight lookup.
    pub fn dismiss(&mut self) {
        self.epoch += 1;
        self.state = SelectionState::Idle;
        self.selection = None;
        self.fallback_pending = false;
    }

    fn accepts(&self, epoch: RequestEpoch) -> bool {
        epoch == self.epoch && matches!(self.state, SelectionState::Loading { .. })
    }

    fn resolve(&mut self, mut facilities: Vec<Facility>, is_nearby_fallback: bool) {
        let Some(current) = self.selection.take() else {
            return;
        };
        sort_by_distance(&mut facilities);
        self.state = SelectionState::Resolved {
            epoch: self.epoch,
            zone_id: current.zone_id.clone(),
        };
        self.selection = Some(ZoneSelection {
            facilities,
            is_nearby_fallback,
            facilities_loading: false,
            ..current
        });
    }

    fn fail(&mut self) {
        let Some(current) = self.selection.take() else {
            return;
        };
        self.state = SelectionState::Failed {
            epoch: self.epoch,
            zone_id: current.zone_id.clone(),
        };
        self.selection = Some(ZoneSelection {
            facilities: Vec::new(),
            is_nearby_fallback: false,
            facilities_loading: false,
            ..current
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use heat_map_heat_models::TemperatureSource;

    use super::*;

    fn zone(id: &str) -> ZoneFeature {
        ZoneFeature {
            id: ZoneId::from(id),
            name: format!("Zone {id}"),
            polygon_ring: vec![
                LngLat::new(125.0, 7.0),
                LngLat::new(125.1, 7.0),
                LngLat::new(125.1, 7.1),
                LngLat::new(125.0, 7.0),
            ],
            centroid: LngLat::new(125.066, 7.033),
            geometry: serde_json::Value::Null,
        }
    }

    fn flat_zone(id: &str) -> ZoneFeature {
        ZoneFeature {
            polygon_ring: Vec::new(),
            ..zone(id)
        }
    }

    fn facility(id: &str, distance_km: Option<f64>, cost: Option<f64>) -> Facility {
        Facility {
            id: id.to_string(),
            name: id.to_string(),
            address: None,
            distance_km,
            location: None,
            typical_cost_php: cost,
        }
    }

    fn dataset() -> TemperatureDataset {
        TemperatureDataset {
            by_zone: BTreeMap::from([(ZoneId::from("A"), 30.0), (ZoneId::from("B"), 42.0)]),
            min: 26.0,
            max: 39.0,
            source: TemperatureSource::Backend,
            average_celsius: None,
            updated_at: None,
        }
    }

    fn unavailable() -> FacilityError {
        FacilityError::Unavailable {
            message: "offline".to_string(),
        }
    }

    #[test]
    fn select_fills_zone_data_synchronously() {
        let mut controller = ZoneSelectionController::new();
        let request = controller.select_zone(&zone("B"), None, Some(&dataset()));

        assert_eq!(request.epoch, 1);
        let selection = controller.selection().unwrap();
        assert_eq!(selection.name, "Zone B");
        assert_eq!(selection.temperature_c, Some(42.0));
        assert_eq!(selection.risk_level, HeatRiskLevel::Danger);
        assert!(selection.facilities_loading);
        assert!(selection.facilities.is_empty());
        assert!(matches!(controller.state(), SelectionState::Loading { epoch: 1, .. }));
    }

    #[test]
    fn zone_without_data_is_lowest_risk() {
        let mut controller = ZoneSelectionController::new();
        controller.select_zone(&zone("C"), None, Some(&dataset()));
        let selection = controller.selection().unwrap();
        assert_eq!(selection.temperature_c, None);
        assert_eq!(selection.risk_level, HeatRiskLevel::NotHazardous);
    }

    #[test]
    fn stale_response_never_overwrites_newer_selection() {
        let mut controller = ZoneSelectionController::new();
        let a = controller.select_zone(&zone("A"), None, Some(&dataset()));
        let b = controller.select_zone(&zone("B"), None, Some(&dataset()));

        let outcome = controller.apply_facilities(a.epoch, Ok(vec![facility("a1", Some(1.0), None)]));
        assert_eq!(outcome, LookupOutcome::Discarded);
        let selection = controller.selection().unwrap();
        assert_eq!(selection.zone_id.as_str(), "B");
        assert!(selection.facilities.is_empty());
        assert!(selection.facilities_loading);

        controller.apply_facilities(b.epoch, Ok(vec![facility("b1", Some(1.0), None)]));
        let selection = controller.selection().unwrap();
        assert_eq!(selection.zone_id.as_str(), "B");
        assert_eq!(selection.facilities[0].id, "b1");
    }

    #[test]
    fn resolved_facilities_are_sorted() {
        let mut controller = ZoneSelectionController::new();
        let request = controller.select_zone(&zone("A"), None, None);
        controller.apply_facilities(
            request.epoch,
            Ok(vec![
                facility("unknown", None, None),
                facility("far", Some(4.0), None),
                facility("near", Some(0.5), None),
            ]),
        );

        let ids: Vec<_> = controller
            .selection()
            .unwrap()
            .facilities
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, ["near", "far", "unknown"]);
        assert!(matches!(controller.state(), SelectionState::Resolved { .. }));
        assert!(!controller.selection().unwrap().is_nearby_fallback);
    }

    #[test]
    fn empty_zone_requests_exactly_one_fallback() {
        let mut controller = ZoneSelectionController::new();
        let request = controller.select_zone(&zone("A"), None, None);

        let outcome = controller.apply_facilities(request.epoch, Ok(Vec::new()));
        let LookupOutcome::NeedsFallback(fallback) = outcome else {
            panic!("expected a fallback request, got {outcome:?}");
        };
        assert_eq!(fallback.epoch, request.epoch);
        assert!(controller.selection().unwrap().facilities_loading);

        assert_eq!(
            controller.apply_facilities(request.epoch, Ok(Vec::new())),
            LookupOutcome::Discarded
        );

        controller.apply_fallback(fallback.epoch, Ok(vec![facility("n1", Some(2.0), None)]));
        let selection = controller.selection().unwrap();
        assert!(selection.is_nearby_fallback);
        assert!(!selection.facilities_loading);

        assert_eq!(
            controller.apply_fallback(fallback.epoch, Ok(Vec::new())),
            LookupOutcome::Discarded
        );
    }

    #[test]
    fn empty_fallback_is_not_flagged_nearby() {
        let mut controller = ZoneSelectionController::new();
        let request = controller.select_zone(&zone("A"), None, None);
        controller.apply_facilities(request.epoch, Ok(Vec::new()));
        controller.apply_fallback(request.epoch, Ok(Vec::new()));

        let selection = controller.selection().unwrap();
        assert!(!selection.is_nearby_fallback);
        assert!(selection.facilities.is_empty());
        assert!(matches!(controller.state(), SelectionState::Resolved { .. }));
    }

    #[test]
    fn empty_zone_without_centroid_finalizes_immediately() {
        let mut controller = ZoneSelectionController::new();
        let request = controller.select_zone(&flat_zone("A"), None, None);
        assert!(request.center.is_none());
        assert_eq!(
            controller.apply_facilities(request.epoch, Ok(Vec::new())),
            LookupOutcome::Finalized
        );
        assert!(!controller.selection().unwrap().facilities_loading);
    }

    #[test]
    fn explicit_centroid_overrides_zone_centroid() {
        let mut controller = ZoneSelectionController::new();
        let point = LngLat::new(125.5, 7.2);
        let request = controller.select_zone(&flat_zone("A"), Some(point), None);
        assert_eq!(request.center, Some(point));
    }

    #[test]
    fn errors_fail_without_facilities() {
        let mut controller = ZoneSelectionController::new();
        let request = controller.select_zone(&zone("A"), None, None);
        controller.apply_facilities(request.epoch, Err(unavailable()));
        assert!(matches!(controller.state(), SelectionState::Failed { epoch: 1, .. }));
        assert!(controller.selection().unwrap().facilities.is_empty());

        let request = controller.select_zone(&zone("B"), None, None);
        controller.apply_facilities(request.epoch, Ok(Vec::new()));
        controller.apply_fallback(request.epoch, Err(unavailable()));
        assert!(matches!(controller.state(), SelectionState::Failed { epoch: 2, .. }));
        assert!(!controller.selection().unwrap().is_nearby_fallback);
    }

    #[test]
    fn dismiss_invalidates_in_flight_lookup() {
        let mut controller = ZoneSelectionController::new();
        let request = controller.select_zone(&zone("A"), None, None);
        controller.dismiss();

        assert_eq!(controller.state(), &SelectionState::Idle);
        assert_eq!(
            controller.apply_facilities(request.epoch, Ok(vec![facility("a1", None, None)])),
            LookupOutcome::Discarded
        );
        assert!(controller.selection().is_none());
        assert_eq!(controller.epoch(), 2);
    }

    #[test]
    fn budget_filter_keeps_unknown_costs() {
        let mut controller = ZoneSelectionController::new();
        let request = controller.select_zone(&zone("A"), None, None);
        controller.apply_facilities(
            request.epoch,
            Ok(vec![
                facility("cheap", Some(1.0), Some(300.0)),
                facility("pricey", Some(2.0), Some(3000.0)),
                facility("unknown", Some(3.0), None),
            ]),
        );

        let selection = controller.selection().unwrap();
        let visible: Vec<_> = selection
            .visible_facilities(BudgetFilter::Under500)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(visible, ["cheap", "unknown"]);
        assert_eq!(selection.visible_facilities(BudgetFilter::Any).len(), 3);
    }
}
