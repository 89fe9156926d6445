use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::{DEFAULT_WEATHER_BASE_URL, Units},
    http::{build_client, get_json},
    model::{AirQualityIndex, Coordinate, CurrentConditions, FORECAST_POINTS, HourlyPoint},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, units: Units) -> Result<Self> {
        Self::with_base_url(api_key, units, DEFAULT_WEATHER_BASE_URL, Duration::from_secs(10))
    }

    pub fn with_base_url(
        api_key: String,
        units: Units,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_key,
            units,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: build_client(timeout)?,
        })
    }

    fn query(&self, at: Coordinate, with_units: bool) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("lat", at.lat.to_string()),
            ("lon", at.lon.to_string()),
            ("appid", self.api_key.clone()),
        ];
        if with_units {
            query.push(("units", self.units.as_str().to_string()));
        }
        query
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    temp_min: f64,
    #[serde(default)]
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAirMain {
    aqi: u8,
}

#[derive(Debug, Deserialize)]
struct OwAirEntry {
    main: OwAirMain,
}

#[derive(Debug, Deserialize)]
struct OwAirResponse {
    list: Vec<OwAirEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_conditions(&self, at: Coordinate) -> Result<CurrentConditions> {
        let url = format!("{}/weather", self.base_url);
        let parsed: OwCurrentResponse = get_json(
            &self.http,
            &url,
            &self.query(at, true),
            "OpenWeather current weather",
        )
        .await?;

        Ok(CurrentConditions {
            temperature: parsed.main.temp,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            wind_speed: parsed.wind.speed,
            condition: first_condition(&parsed.weather),
            sunrise: unix_to_utc(parsed.sys.sunrise)?,
            sunset: unix_to_utc(parsed.sys.sunset)?,
        })
    }

    async fn fetch_forecast(&self, at: Coordinate) -> Result<Vec<HourlyPoint>> {
        let url = format!("{}/forecast", self.base_url);
        let mut query = self.query(at, true);
        query.push(("cnt", FORECAST_POINTS.to_string()));

        let parsed: OwForecastResponse =
            get_json(&self.http, &url, &query, "OpenWeather forecast").await?;

        parsed
            .list
            .into_iter()
            .take(FORECAST_POINTS)
            .map(|entry| -> Result<HourlyPoint> {
                Ok(HourlyPoint {
                    time: unix_to_utc(entry.dt)?,
                    temperature: entry.main.temp,
                    condition: first_condition(&entry.weather),
                })
            })
            .collect()
    }

    async fn fetch_air_quality(&self, at: Coordinate) -> Result<AirQualityIndex> {
        let url = format!("{}/air_pollution", self.base_url);
        let parsed: OwAirResponse = get_json(
            &self.http,
            &url,
            &self.query(at, false),
            "OpenWeather air pollution",
        )
        .await?;

        parsed
            .list
            .first()
            .map(|entry| AirQualityIndex(entry.main.aqi))
            .ok_or_else(|| anyhow!("OpenWeather air pollution response contained no data"))
    }
}

fn first_condition(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.main.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| anyhow!("Timestamp out of range: {ts}"))
}
