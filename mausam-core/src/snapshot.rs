use anyhow::Result;
use tracing::instrument;

use crate::{
    model::{Coordinate, WeatherSnapshot},
    provider::WeatherProvider,
};

/// Fetch conditions, forecast and air quality for `at` concurrently and merge
/// them. Any one call failing fails the whole snapshot.
#[instrument(skip(provider))]
pub async fn fetch_snapshot(
    provider: &dyn WeatherProvider,
    at: Coordinate,
) -> Result<WeatherSnapshot> {
    let (conditions, forecast, aqi) = tokio::try_join!(
        provider.fetch_conditions(at),
        provider.fetch_forecast(at),
        provider.fetch_air_quality(at),
    )?;

    tracing::debug!(
        temp = conditions.temperature,
        forecast_points = forecast.len(),
        aqi = aqi.value(),
        "weather calls completed"
    );

    Ok(WeatherSnapshot::merge(conditions, forecast, aqi))
}
