//! Builds the [`TemperatureDataset`] for the loaded zones.
//!
//! Never fails. Backend errors, empty responses, and reports covering
//! none of the loaded zones all fall back to [`simulate`].
//!
//! [`simulate`]: crate::simulate::simulate

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use heat_map_city::{ApiConfig, CityDefinition};
use heat_map_city_models::TemperatureDefaults;
use heat_map_heat_models::{TemperatureDataset, TemperatureSource};
use heat_map_zone_models::{LngLat, ZoneFeature, ZoneId};

use crate::normalize::TemperatureReport;
use crate::provider::{HttpTemperatureProvider, TemperatureProvider};
use crate::simulate::simulate;

/// Fetches backend temperatures for a city and reconciles them with the
/// loaded zones.
pub struct TemperatureReconciler {
    provider: Option<Arc<dyn TemperatureProvider>>,
    city_id: String,
    center: LngLat,
    defaults: TemperatureDefaults,
}

impl TemperatureReconciler {
    /// Reconciles readings from `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn TemperatureProvider>, city: &CityDefinition) -> Self {
        Self {
            provider: Some(provider),
            city_id: city.id.clone(),
            center: city.center,
            defaults: city.temperature,
        }
    }

    /// Never contacts a backend; every dataset is simulated.
    #[must_use]
    pub fn simulated(city: &CityDefinition) -> Self {
        Self {
            provider: None,
            city_id: city.id.clone(),
            center: city.center,
            defaults: city.temperature,
        }
    }

    /// Picks the HTTP backend or pure simulation from `config`.
    #[must_use]
    pub fn from_config(client: reqwest::Client, config: &ApiConfig, city: &CityDefinition) -> Self {
        if config.simulate_only {
            log::info!("Simulation-only mode, skipping temperature backend");
            return Self::simulated(city);
        }
        Self::new(
            Arc::new(HttpTemperatureProvider::new(client, config.clone())),
            city,
        )
    }

    /// Produces a dataset for `zones`.
    pub async fn reconcile(&self, zones: &[ZoneFeature]) -> TemperatureDataset {
        let report = match &self.provider {
            Some(provider) => match provider.fetch(&self.city_id).await {
                Ok(report) => Some(report),
                Err(e) => {
                    log::warn!("Temperature backend failed, simulating instead: {e}");
                    None
                }
            },
            None => None,
        };

        reconcile_report(zones, report.as_ref(), self.center, &self.defaults)
    }
}

/// Reconciles an optional backend report with the loaded zones.
///
/// Reported temperatures for unknown zones are ignored. If at least one
/// loaded zone has a reading, the dataset is
/// [`TemperatureSource::Backend`] and unreported zones receive the
/// report's average when it has one. Otherwise every zone is simulated.
///
/// The report's `min`/`max` replace the defaults when present; an
/// inverted range falls back to the defaults entirely.
#[must_use]
pub fn reconcile_report(
    zones: &[ZoneFeature],
    report: Option<&TemperatureReport>,
    center: LngLat,
    defaults: &TemperatureDefaults,
) -> TemperatureDataset {
    let (min, max) = display_range(report, defaults);

    let known: BTreeSet<&ZoneId> = zones.iter().map(|z| &z.id).collect();
    let usable: BTreeMap<ZoneId, f64> = report
        .map(|r| {
            r.temperatures
                .iter()
                .filter(|(id, t)| t.is_finite() && known.contains(id))
                .map(|(id, &t)| (id.clone(), t))
                .collect()
        })
        .unwrap_or_default();

    if let Some(report) = report {
        let ignored = report.temperatures.len() - usable.len();
        if ignored > 0 {
            log::debug!("Ignoring {ignored} temperatures for zones that are not loaded");
        }
    }

    if usable.is_empty() {
        if report.is_some() {
            log::warn!("Backend reported no temperatures for loaded zones, simulating");
        }
        return TemperatureDataset {
            by_zone: simulate(zones, center, min, max),
            min,
            max,
            source: TemperatureSource::Simulated,
            average_celsius: None,
            updated_at: None,
        };
    }

    let average = report
        .and_then(|r| r.average_celsius)
        .filter(|a| a.is_finite());

    let mut by_zone = usable;
    if let Some(average) = average {
        for zone in zones {
            by_zone.entry(zone.id.clone()).or_insert(average);
        }
    }

    log::info!(
        "Reconciled {} of {} zones from backend data",
        by_zone.len(),
        zones.len()
    );

    TemperatureDataset {
        by_zone,
        min,
        max,
        source: TemperatureSource::Backend,
        average_celsius: average,
        updated_at: report.and_then(|r| r.updated_at),
    }
}

fn display_range(report: Option<&TemperatureReport>, defaults: &TemperatureDefaults) -> (f64, f64) {
    let fallback = (defaults.default_min, defaults.default_max);
    let Some(report) = report else {
        return fallback;
    };

    let min = report
        .min
        .filter(|v| v.is_finite())
        .unwrap_or(defaults.default_min);
    let max = report
        .max
        .filter(|v| v.is_finite())
        .unwrap_or(defaults.default_max);

    if min > max {
        log::warn!("Ignoring inverted temperature range {min}..{max}");
        fallback
    } else {
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use heat_map_heat_models::HeatRiskLevel;

    use super::*;
    use crate::normalize::normalize_report;
    use crate::{HeatError, classify};

    const CENTER: LngLat = LngLat::new(125.4553, 7.1907);

    const DEFAULTS: TemperatureDefaults = TemperatureDefaults {
        default_min: 26.0,
        default_max: 39.0,
    };

    fn zone(id: &str, lng: f64) -> ZoneFeature {
        let lat = 7.19;
        ZoneFeature {
            id: ZoneId::from(id),
            name: id.to_string(),
            polygon_ring: vec![
                LngLat::new(lng, lat),
                LngLat::new(lng + 0.01, lat),
                LngLat::new(lng + 0.01, lat + 0.01),
                LngLat::new(lng, lat),
            ],
            centroid: LngLat::new(lng + 0.005, lat + 0.003),
            geometry: serde_json::Value::Null,
        }
    }

    fn zones() -> Vec<ZoneFeature> {
        vec![zone("A", 125.40), zone("B", 125.45), zone("C", 125.50)]
    }

    struct FixedProvider(Result<serde_json::Value, ()>);

    #[async_trait]
    impl TemperatureProvider for FixedProvider {
        async fn fetch(&self, _city_id: &str) -> Result<TemperatureReport, HeatError> {
            match &self.0 {
                Ok(body) => normalize_report(body),
                Err(()) => Err(HeatError::Unavailable {
                    message: "offline".to_string(),
                }),
            }
        }
    }

    fn city() -> CityDefinition {
        heat_map_city::city("davao").unwrap()
    }

    #[test]
    fn fills_missing_zones_with_average() {
        let report = normalize_report(&serde_json::json!({
            "temperatures": {"A": 30, "B": 42, "C": null},
            "min": 26,
            "max": 39,
            "averageCelsius": 34
        }))
        .unwrap();

        let dataset = reconcile_report(&zones(), Some(&report), CENTER, &DEFAULTS);

        assert_eq!(dataset.source, TemperatureSource::Backend);
        assert_eq!(dataset.by_zone[&ZoneId::from("A")], 30.0);
        assert_eq!(dataset.by_zone[&ZoneId::from("B")], 42.0);
        assert_eq!(dataset.by_zone[&ZoneId::from("C")], 34.0);
        assert_eq!((dataset.min, dataset.max), (26.0, 39.0));
        assert_eq!(dataset.average_celsius, Some(34.0));

        let a = classify(dataset.celsius(&ZoneId::from("A")));
        let b = classify(dataset.celsius(&ZoneId::from("B")));
        let c = classify(dataset.celsius(&ZoneId::from("C")));
        assert_eq!(a, HeatRiskLevel::Caution);
        assert_eq!(b, HeatRiskLevel::Danger);
        assert_eq!(c, HeatRiskLevel::ExtremeCaution);
        assert!(b > c && c > a);
    }

    #[test]
    fn without_average_unreported_zones_have_no_data() {
        let report =
            normalize_report(&serde_json::json!({"temperatures": {"A": 30}})).unwrap();
        let dataset = reconcile_report(&zones(), Some(&report), CENTER, &DEFAULTS);
        assert_eq!(dataset.by_zone.len(), 1);
        assert!(dataset.celsius(&ZoneId::from("C")).is_none());
    }

    #[test]
    fn unknown_zones_only_triggers_simulation() {
        let report =
            normalize_report(&serde_json::json!({"temperatures": {"Z": 30}, "min": 20, "max": 40}))
                .unwrap();
        let dataset = reconcile_report(&zones(), Some(&report), CENTER, &DEFAULTS);

        assert_eq!(dataset.source, TemperatureSource::Simulated);
        assert_eq!(dataset.by_zone.len(), 3);
        assert!(!dataset.by_zone.contains_key(&ZoneId::from("Z")));
        assert_eq!((dataset.min, dataset.max), (20.0, 40.0));
    }

    #[test]
    fn inverted_range_uses_defaults() {
        let report = normalize_report(
            &serde_json::json!({"temperatures": {"A": 30}, "min": 45, "max": 20}),
        )
        .unwrap();
        let dataset = reconcile_report(&zones(), Some(&report), CENTER, &DEFAULTS);
        assert_eq!((dataset.min, dataset.max), (26.0, 39.0));
    }

    #[test]
    fn simulated_dataset_is_complete_and_in_range() {
        let dataset = reconcile_report(&zones(), None, CENTER, &DEFAULTS);
        assert_eq!(dataset.source, TemperatureSource::Simulated);
        assert_eq!(dataset.by_zone.len(), 3);
        assert!(dataset.min <= dataset.max);
        for t in dataset.by_zone.values() {
            assert!(t.is_finite());
            assert!((dataset.min..=dataset.max).contains(t));
        }
        assert_eq!(dataset, reconcile_report(&zones(), None, CENTER, &DEFAULTS));
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_simulation() {
        let reconciler = TemperatureReconciler::new(Arc::new(FixedProvider(Err(()))), &city());
        let dataset = reconciler.reconcile(&zones()).await;
        assert_eq!(dataset.source, TemperatureSource::Simulated);
        assert_eq!(dataset.by_zone.len(), 3);
    }

    #[tokio::test]
    async fn empty_backend_response_falls_back_to_simulation() {
        let reconciler = TemperatureReconciler::new(
            Arc::new(FixedProvider(Ok(serde_json::json!({"temperatures": {}})))),
            &city(),
        );
        let dataset = reconciler.reconcile(&zones()).await;
        assert_eq!(dataset.source, TemperatureSource::Simulated);
    }

    #[tokio::test]
    async fn simulate_only_config_skips_backend() {
        let config = ApiConfig::from_values(Some("https://heat.example.org"), Some("1"));
        let reconciler = TemperatureReconciler::from_config(reqwest::Client::new(), &config, &city());
        let dataset = reconciler.reconcile(&zones()).await;
        assert_eq!(dataset.source, TemperatureSource::Simulated);
    }
}
