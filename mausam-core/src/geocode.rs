//! Forward and reverse geocoding against the OpenWeather geo API.
//!
//! Failures never reach the caller: a failed search looks like a search with
//! no matches, and a failed reverse lookup yields [`UNKNOWN_LOCATION`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    Config,
    config::DEFAULT_GEO_BASE_URL,
    http::{build_client, get_json},
    model::{Coordinate, PlaceCandidate, place_label},
};

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Most candidates the geo API returns for one query.
pub const MAX_SEARCH_LIMIT: u8 = 5;

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Places matching `query`, at most `limit` of them, in service order.
    async fn search_places(&self, query: &str, limit: u8) -> Vec<PlaceCandidate>;

    /// Human-readable label for `at`, or [`UNKNOWN_LOCATION`].
    async fn reverse_geocode(&self, at: Coordinate) -> String;
}

pub fn geocoder_from_config(config: &Config) -> anyhow::Result<Arc<dyn Geocoder>> {
    let api_key = config.require_api_key()?;
    let geocoder = OpenWeatherGeocoder::with_base_url(
        api_key.to_owned(),
        &config.endpoints.geo_base_url,
        config.timeout(),
    )?;

    Ok(Arc::new(geocoder))
}

#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    country: String,
    state: Option<String>,
}

impl From<GeoEntry> for PlaceCandidate {
    fn from(entry: GeoEntry) -> Self {
        PlaceCandidate {
            name: entry.name,
            state: entry.state,
            country: entry.country,
            coordinate: Coordinate::new(entry.lat, entry.lon),
        }
    }
}

impl OpenWeatherGeocoder {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, DEFAULT_GEO_BASE_URL, Duration::from_secs(10))
    }

    pub fn with_base_url(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: build_client(timeout)?,
        })
    }

    async fn direct(&self, query: &str, limit: u8) -> anyhow::Result<Vec<GeoEntry>> {
        let url = format!("{}/direct", self.base_url);
        let params = [
            ("q", query.to_string()),
            ("limit", limit.to_string()),
            ("appid", self.api_key.clone()),
        ];
        get_json(&self.http, &url, &params, "OpenWeather geocoding").await
    }

    async fn reverse(&self, at: Coordinate) -> anyhow::Result<Vec<GeoEntry>> {
        let url = format!("{}/reverse", self.base_url);
        let params = [
            ("lat", at.lat.to_string()),
            ("lon", at.lon.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];
        get_json(&self.http, &url, &params, "OpenWeather reverse geocoding").await
    }
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    async fn search_places(&self, query: &str, limit: u8) -> Vec<PlaceCandidate> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.direct(query, limit.clamp(1, MAX_SEARCH_LIMIT)).await {
            Ok(entries) => entries.into_iter().map(PlaceCandidate::from).collect(),
            Err(e) => {
                tracing::warn!("Place search for {:?} failed: {:#}", query, e);
                Vec::new()
            }
        }
    }

    async fn reverse_geocode(&self, at: Coordinate) -> String {
        match self.reverse(at).await {
            Ok(entries) => match entries.first() {
                Some(entry) => {
                    let label = place_label(&entry.name, entry.state.as_deref(), &entry.country);
                    tracing::info!("Reverse geocoded {} to: {}", at, label);
                    label
                }
                None => UNKNOWN_LOCATION.to_string(),
            },
            Err(e) => {
                tracing::warn!("Reverse geocode for {} failed: {:#}", at, e);
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}
