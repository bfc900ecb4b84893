#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City registry and backend configuration for the heat map.
//!
//! Cities are TOML files under `cities/` embedded at compile time (see
//! [`registry`]). Backend settings are read from the environment at
//! runtime (see [`config`]).

pub mod config;
pub mod registry;

pub use config::ApiConfig;
pub use heat_map_city_models::CityDefinition;
pub use registry::{all_cities, city};
