//! Core library for `mausam`.
//!
//! This crate defines:
//! - Configuration handling
//! - Geocoding and weather clients for OpenWeather
//! - Merging of the weather calls into one snapshot
//! - The application state machine that front-ends drive
//!
//! It is used by `mausam-cli`, but any front-end can drive [`WeatherApp`].

pub mod app;
pub mod config;
pub mod display;
pub mod geocode;
mod http;
pub mod location;
pub mod model;
pub mod provider;
pub mod snapshot;

pub use app::{AppState, Phase, WeatherApp};
pub use config::{Config, Endpoints, ResponseOrdering, Units};
pub use geocode::{Geocoder, OpenWeatherGeocoder};
pub use location::{FixedLocation, LocationError, LocationSource};
pub use model::{
    AirQualityIndex, Coordinate, CurrentConditions, HourlyPoint, PlaceCandidate, WeatherSnapshot,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use snapshot::fetch_snapshot;
