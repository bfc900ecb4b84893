#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the heat risk map engine.
//!
//! Loads a city's zones, reconciles temperatures, and exercises search,
//! facility lookup, and the map session against a console map. Backend
//! settings come from `HEAT_MAP_API_URL` and `HEAT_MAP_SIMULATE_ONLY`.

mod console_map;

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use heat_map_city::{ApiConfig, CityDefinition};
use heat_map_facilities::{
    BudgetFilter, FacilityProvider, HttpFacilityProvider, MockFacilityProvider,
};
use heat_map_geocoder::{Geocoder, NominatimGeocoder};
use heat_map_geometry::{
    BoundaryProvider, GeojsonUrlProvider, GeometryIndex, StaticBoundaryProvider,
};
use heat_map_heat::{
    HeatRiskLevel, HttpTemperatureProvider, TemperatureReconciler, classify, heat_points,
};
use heat_map_search::{ConsentPrompt, GeolocationFailure, GeolocationSource, HitOrigin};
use heat_map_selection::{lock_selection, run_facility_lookup};
use heat_map_viewport::{EventOutcome, MapEvent, MapViewportAdapter, SessionStatus};
use heat_map_zone_models::{LngLat, ZoneFeature, ZoneId};

use crate::console_map::ConsoleMap;

const USER_AGENT: &str = "heat_map_cli/0.1";

#[derive(Parser)]
#[command(name = "heat_map", about = "Heat risk choropleth map engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured cities
    Cities,
    /// Print the heat risk level table
    Levels,
    /// Probe the temperature backend
    Status {
        /// City identifier (e.g., "davao")
        #[arg(long, default_value = "davao")]
        city: String,
    },
    /// Load zones and print their reconciled temperatures
    Zones {
        /// City identifier (e.g., "davao")
        #[arg(long, default_value = "davao")]
        city: String,
        /// Local `GeoJSON` file to use instead of the city's boundary URL
        #[arg(long)]
        boundaries: Option<String>,
        /// Print the dataset and heat points as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a place name or address
    Search {
        /// Free-text query
        query: String,
        /// City identifier (e.g., "davao")
        #[arg(long, default_value = "davao")]
        city: String,
        /// Local `GeoJSON` file to use instead of the city's boundary URL
        #[arg(long)]
        boundaries: Option<String>,
        /// Only match zone names; never call the geocoder
        #[arg(long)]
        no_geocoder: bool,
    },
    /// List health facilities for a zone
    Facilities {
        /// Zone identifier
        zone: String,
        /// Zone center as "lng,lat", used for distances and the nearby fallback
        #[arg(long, value_parser = parse_lng_lat)]
        center: Option<LngLat>,
        /// Budget filter: any, under500, 500-1000, 1000-2500, 2500plus
        #[arg(long, default_value = "any", value_parser = parse_budget)]
        budget: BudgetFilter,
        /// Use deterministic demo facilities instead of the backend
        #[arg(long)]
        mock: bool,
    },
    /// Run a full map session on a console map
    Map {
        /// City identifier (e.g., "davao")
        #[arg(long, default_value = "davao")]
        city: String,
        /// Local `GeoJSON` file to use instead of the city's boundary URL
        #[arg(long)]
        boundaries: Option<String>,
        /// Click at "lng,lat" once the map is ready
        #[arg(long, value_parser = parse_lng_lat)]
        click: Option<LngLat>,
        /// Use deterministic demo facilities instead of the backend
        #[arg(long)]
        mock: bool,
    },
}

/// Device location is not available from a terminal.
struct NoGeolocation;

#[async_trait]
impl GeolocationSource for NoGeolocation {
    fn is_secure_context(&self) -> bool {
        true
    }

    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<LngLat, GeolocationFailure> {
        Err(GeolocationFailure {
            code: 2,
            message: Some("No positioning hardware".to_string()),
        })
    }
}

struct DeclineConsent;

impl ConsentPrompt for DeclineConsent {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}

fn parse_lng_lat(raw: &str) -> Result<LngLat, String> {
    let (lng, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lng,lat\", got \"{raw}\""))?;
    let position = LngLat::new(
        lng.trim().parse().map_err(|e| format!("invalid longitude: {e}"))?,
        lat.trim().parse().map_err(|e| format!("invalid latitude: {e}"))?,
    );
    if position.is_valid() {
        Ok(position)
    } else {
        Err(format!("coordinates out of range: {raw}"))
    }
}

fn parse_budget(raw: &str) -> Result<BudgetFilter, String> {
    raw.parse()
        .map_err(|_| format!("unknown budget filter \"{raw}\""))
}

fn lookup_city(id: &str) -> Result<CityDefinition, Box<dyn std::error::Error>> {
    heat_map_city::city(id).ok_or_else(|| format!("Unknown city: {id}").into())
}

fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

fn boundary_provider(
    client: &reqwest::Client,
    city: &CityDefinition,
    file: Option<&str>,
) -> Result<Arc<dyn BoundaryProvider>, Box<dyn std::error::Error>> {
    Ok(match file {
        Some(path) => {
            log::info!("Reading zone boundaries from {path}");
            let collection = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Arc::new(StaticBoundaryProvider::new(collection))
        }
        None => Arc::new(GeojsonUrlProvider::new(
            client.clone(),
            city.boundaries.url.clone(),
        )),
    })
}

fn facility_provider(
    client: &reqwest::Client,
    config: &ApiConfig,
    mock: bool,
) -> Arc<dyn FacilityProvider> {
    if mock {
        Arc::new(MockFacilityProvider)
    } else {
        Arc::new(HttpFacilityProvider::new(client.clone(), config.clone()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = ApiConfig::from_env();

    match cli.command {
        Commands::Cities => {
            for city in heat_map_city::all_cities() {
                println!(
                    "{:<10} {:<20} {:.4}, {:.4}",
                    city.id, city.name, city.center.lat, city.center.lng
                );
            }
        }
        Commands::Levels => {
            for level in HeatRiskLevel::all() {
                println!(
                    "{}  {:<16} {:<10} {}",
                    level.level(),
                    level.label(),
                    level.range_label(),
                    level.color()
                );
            }
        }
        Commands::Status { city } => {
            let city = lookup_city(&city)?;
            let provider = HttpTemperatureProvider::new(http_client()?, config);
            let status = provider.ping_backend(&city.id).await;
            if status.ok {
                println!("Temperature backend reachable for {}", city.name);
            } else {
                println!(
                    "Temperature backend unavailable: {}",
                    status.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        Commands::Zones {
            city,
            boundaries,
            json,
        } => {
            let city = lookup_city(&city)?;
            let client = http_client()?;
            let provider = boundary_provider(&client, &city, boundaries.as_deref())?;
            let index = GeometryIndex::load(provider.as_ref(), &city.boundaries.fields).await?;
            let reconciler = TemperatureReconciler::from_config(client, &config, &city);
            let dataset = reconciler.reconcile(index.zones()).await;

            if json {
                let output = serde_json::json!({
                    "dataset": dataset,
                    "heatPoints": heat_points(index.zones(), &dataset),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            println!(
                "{} zones, {} temperatures, range {:.1}-{:.1} °C",
                index.len(),
                dataset.source,
                dataset.min,
                dataset.max
            );
            for zone in index.zones() {
                let celsius = dataset.celsius(&zone.id);
                println!(
                    "{:<12} {:<32} {:>6} {}",
                    zone.id.as_str(),
                    zone.name,
                    celsius.map_or_else(|| "-".to_string(), |c| format!("{c:.1}")),
                    classify(celsius).label()
                );
            }
        }
        Commands::Search {
            query,
            city,
            boundaries,
            no_geocoder,
        } => {
            let city = lookup_city(&city)?;
            let client = http_client()?;
            let provider = boundary_provider(&client, &city, boundaries.as_deref())?;
            let index = GeometryIndex::load(provider.as_ref(), &city.boundaries.fields).await?;
            let geocoder: Option<Arc<dyn Geocoder>> = if no_geocoder {
                None
            } else {
                Some(Arc::new(NominatimGeocoder::new()?))
            };
            let controller = heat_map_search::LocationSearchController::new(
                geocoder,
                city.geocode_context.clone(),
                Arc::new(NoGeolocation),
                Arc::new(DeclineConsent),
            );

            match controller.search(&index, &query).await {
                Ok(hit) => {
                    let origin = match &hit.origin {
                        HitOrigin::Zone(id) => index
                            .get(id)
                            .map_or_else(|| id.to_string(), |z| format!("zone {}", z.name)),
                        HitOrigin::Geocoded { display_name } => display_name
                            .clone()
                            .unwrap_or_else(|| "geocoder".to_string()),
                        HitOrigin::Device => "device".to_string(),
                    };
                    println!(
                        "{:.5}, {:.5} at zoom {} ({origin})",
                        hit.position.lat, hit.position.lng, hit.zoom
                    );
                }
                Err(e) => println!("{e}"),
            }
        }
        Commands::Facilities {
            zone,
            center,
            budget,
            mock,
        } => {
            let provider = facility_provider(&http_client()?, &config, mock);
            let zone = ZoneFeature {
                id: ZoneId::from(zone.as_str()),
                name: zone.clone(),
                polygon_ring: Vec::new(),
                centroid: LngLat::new(0.0, 0.0),
                geometry: serde_json::Value::Null,
            };
            let shared = heat_map_selection::shared();
            let request = lock_selection(&shared).select_zone(&zone, center, None);
            let outcome = run_facility_lookup(
                Arc::clone(&shared),
                provider,
                request,
                heat_map_selection::CancellationFlag::new(),
            )
            .await;
            log::debug!("Lookup finished: {outcome:?}");

            let controller = lock_selection(&shared);
            let Some(selection) = controller.selection() else {
                return Ok(());
            };
            if selection.is_nearby_fallback {
                println!("No facilities in {}; showing nearby facilities", zone.id);
            }
            let visible = selection.visible_facilities(budget);
            if visible.is_empty() {
                println!("No facilities ({})", budget.label());
            }
            for facility in visible {
                println!(
                    "{:>6}  {}{}",
                    facility
                        .distance_km
                        .map_or_else(|| "?".to_string(), |d| format!("{d:.1} km")),
                    facility.name,
                    facility
                        .address
                        .as_deref()
                        .map_or_else(String::new, |a| format!(", {a}"))
                );
            }
        }
        Commands::Map {
            city,
            boundaries,
            click,
            mock,
        } => {
            let city = lookup_city(&city)?;
            let client = http_client()?;
            let adapter = MapViewportAdapter::new(
                city.clone(),
                boundary_provider(&client, &city, boundaries.as_deref())?,
                Arc::new(TemperatureReconciler::from_config(
                    client.clone(),
                    &config,
                    &city,
                )),
                facility_provider(&client, &config, mock),
            );

            let mut session = adapter.mount(Box::new(ConsoleMap::default()));
            let result = adapter.initialize(&mut session).await;
            if let SessionStatus::Failed(message) = session.status() {
                println!("Map failed to load: {message}");
            }
            if let Err(e) = result {
                adapter.teardown(&mut session);
                return Err(e.into());
            }

            if let Some(point) = click
                && let EventOutcome::Selected { zone_id, lookup } =
                    adapter.handle_event(&mut session, MapEvent::Click(point))
            {
                lookup.await?;
                let shared = session.selection();
                let controller = lock_selection(&shared);
                if let Some(selection) = controller.selection() {
                    println!(
                        "{} ({zone_id}): {}, risk {} {}, {} facilities",
                        selection.name,
                        selection
                            .temperature_c
                            .map_or_else(|| "no data".to_string(), |c| format!("{c:.1} °C")),
                        selection.risk_level.level(),
                        selection.risk_level.label(),
                        selection.facilities.len()
                    );
                }
            }

            adapter.teardown(&mut session);
        }
    }

    Ok(())
}
