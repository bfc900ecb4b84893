//! Compile-time registry of city definitions.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a city requires creating a TOML file in `cities/` and adding a
//! corresponding entry here.

use heat_map_city_models::CityDefinition;

/// Number of registered cities. Enforced by a test.
#[cfg(test)]
const EXPECTED_CITY_COUNT: usize = 1;

/// Embedded TOML city definitions.
const CITY_TOMLS: &[(&str, &str)] = &[("davao", include_str!("../cities/davao.toml"))];

/// Returns all registered cities.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_cities() -> Vec<CityDefinition> {
    CITY_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse city definition '{name}': {e}"))
        })
        .collect()
}

/// Looks up a city by id (case-insensitive).
#[must_use]
pub fn city(id: &str) -> Option<CityDefinition> {
    let found = all_cities()
        .into_iter()
        .find(|c| c.id.eq_ignore_ascii_case(id.trim()));
    if found.is_none() {
        log::warn!("Unknown city '{id}'");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_cities() {
        let cities = all_cities();
        assert_eq!(
            cities.len(),
            EXPECTED_CITY_COUNT,
            "Expected {EXPECTED_CITY_COUNT} cities, found {}. \
             Update EXPECTED_CITY_COUNT after adding/removing cities.",
            cities.len()
        );
    }

    #[test]
    fn city_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for c in &all_cities() {
            assert!(seen.insert(c.id.clone()), "Duplicate city ID: {}", c.id);
        }
    }

    #[test]
    fn all_cities_have_required_fields() {
        for c in &all_cities() {
            assert!(!c.id.is_empty(), "City has empty id");
            assert!(!c.name.is_empty(), "City {} has empty name", c.id);
            assert!(c.center.is_valid(), "City {} has invalid center", c.id);
            assert!(
                c.boundaries.url.starts_with("https://"),
                "City {} boundary URL must be https",
                c.id
            );
            assert!(
                !c.boundaries.fields.id.is_empty() && !c.boundaries.fields.name.is_empty(),
                "City {} has empty field mapping",
                c.id
            );
            assert!(
                c.temperature.default_min <= c.temperature.default_max,
                "City {} has an inverted default range",
                c.id
            );
        }
    }

    #[test]
    fn davao_matches_known_constants() {
        let davao = city("DAVAO").unwrap();
        assert!((davao.center.lat - 7.1907).abs() < 1e-9);
        assert!((davao.center.lng - 125.4553).abs() < 1e-9);
        assert!((davao.temperature.default_min - 26.0).abs() < f64::EPSILON);
        assert!((davao.temperature.default_max - 39.0).abs() < f64::EPSILON);
        assert_eq!(davao.boundaries.fields.id[0], "adm4_psgc");
    }

    #[test]
    fn unknown_city_is_none() {
        assert!(city("atlantis").is_none());
    }
}
