//! Deterministic demo facilities for running without a backend.

use async_trait::async_trait;
use heat_map_facilities_models::Facility;
use heat_map_zone_models::{LngLat, ZoneId};

use crate::FacilityError;
use crate::normalize::sort_by_distance;
use crate::provider::FacilityProvider;

const MOCK_NAMES: [&str; 8] = [
    "Davao City Health Office",
    "Southern Philippines Medical Center",
    "Barangay Health Center 1",
    "Barangay Health Center 2",
    "Davao Doctors Hospital",
    "Medical Center 3",
    "Community Clinic",
    "Rural Health Unit",
];

/// Serves a stable list of three to six facilities per zone, seeded by
/// the last four characters of the zone id.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockFacilityProvider;

impl MockFacilityProvider {
    /// Facilities for a zone id. Non-numeric suffixes seed with zero.
    #[must_use]
    pub fn facilities_for(zone_id: &str) -> Vec<Facility> {
        let seed = seed_of(zone_id);
        let count = 3 + seed % 4;

        let mut facilities: Vec<Facility> = (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let distance_km = if i == 0 { 0.0 } else { (1 + i % 3) as f64 };
                Facility {
                    id: format!("fac-{zone_id}-{i}"),
                    name: MOCK_NAMES[(seed + i) % MOCK_NAMES.len()].to_string(),
                    address: (i == 0).then(|| "Near this area".to_string()),
                    distance_km: Some(distance_km),
                    location: None,
                    typical_cost_php: None,
                }
            })
            .collect();
        sort_by_distance(&mut facilities);
        facilities
    }
}

fn seed_of(zone_id: &str) -> usize {
    let chars: Vec<char> = zone_id.chars().collect();
    let suffix: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    suffix.parse().unwrap_or(0)
}

#[async_trait]
impl FacilityProvider for MockFacilityProvider {
    async fn by_zone(
        &self,
        zone_id: &ZoneId,
        _center: Option<LngLat>,
    ) -> Result<Vec<Facility>, FacilityError> {
        Ok(Self::facilities_for(zone_id.as_str()))
    }

    async fn nearby(&self, _center: LngLat) -> Result<Vec<Facility>, FacilityError> {
        Ok(Self::facilities_for("nearby"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_by_last_four_digits() {
        let facilities = MockFacilityProvider::facilities_for("1130700005");
        // seed 5: four entries starting at name index 5
        assert_eq!(facilities.len(), 4);
        assert_eq!(facilities[0].name, "Medical Center 3");
        assert_eq!(facilities[0].id, "fac-1130700005-0");
        assert_eq!(facilities[0].address.as_deref(), Some("Near this area"));
        let by_distance: Vec<_> = facilities.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            by_distance,
            [
                "Medical Center 3",
                "Davao City Health Office",
                "Community Clinic",
                "Rural Health Unit",
            ]
        );
    }

    #[test]
    fn non_numeric_ids_seed_with_zero() {
        let facilities = MockFacilityProvider::facilities_for("abc");
        assert_eq!(facilities.len(), 3);
        assert_eq!(facilities[0].name, "Davao City Health Office");
    }

    #[test]
    fn is_stable_and_sorted() {
        let a = MockFacilityProvider::facilities_for("1130700042");
        assert_eq!(a, MockFacilityProvider::facilities_for("1130700042"));
        assert!(
            a.windows(2)
                .all(|w| w[0].distance_km <= w[1].distance_km)
        );
    }

    #[tokio::test]
    async fn provider_is_never_empty() {
        let provider = MockFacilityProvider;
        let facilities = provider.by_zone(&ZoneId::from("7"), None).await.unwrap();
        assert!(facilities.len() >= 3);
    }
}
