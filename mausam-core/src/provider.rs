use crate::{
    Config,
    model::{AirQualityIndex, Coordinate, CurrentConditions, HourlyPoint},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Remote weather service. All three calls take the same coordinate and are
/// merged by [`crate::snapshot::fetch_snapshot`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_conditions(&self, at: Coordinate) -> anyhow::Result<CurrentConditions>;

    /// Forecast samples in service order; implementations may return more
    /// than a snapshot keeps.
    async fn fetch_forecast(&self, at: Coordinate) -> anyhow::Result<Vec<HourlyPoint>>;

    async fn fetch_air_quality(&self, at: Coordinate) -> anyhow::Result<AirQualityIndex>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;
    let provider = OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        config.units,
        &config.endpoints.weather_base_url,
        config.timeout(),
    )?;

    Ok(Arc::new(provider))
}
