use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of forecast samples kept in a snapshot.
pub const FORECAST_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// One geocoding match, in the order the service returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
    pub coordinate: Coordinate,
}

impl PlaceCandidate {
    /// "Name, State" when the admin region is known, "Name, Country" otherwise.
    pub fn label(&self) -> String {
        place_label(&self.name, self.state.as_deref(), &self.country)
    }
}

pub(crate) fn place_label(name: &str, state: Option<&str>, country: &str) -> String {
    let region = state.filter(|s| !s.trim().is_empty()).unwrap_or(country);
    format!("{name}, {region}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_speed: f64,
    pub condition: String,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub condition: String,
}

/// OpenWeather air quality index: 1 (good) to 5 (very poor). Zero means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirQualityIndex(pub u8);

impl AirQualityIndex {
    pub fn value(self) -> u8 {
        self.0
    }
}

/// The complete view model shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_speed: f64,
    pub condition: String,
    pub aqi: AirQualityIndex,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub hourly: Vec<HourlyPoint>,
}

impl WeatherSnapshot {
    /// Combine the three service responses. Only the first
    /// [`FORECAST_POINTS`] forecast samples are kept, in service order.
    pub fn merge(
        conditions: CurrentConditions,
        forecast: Vec<HourlyPoint>,
        aqi: AirQualityIndex,
    ) -> Self {
        Self {
            temperature: conditions.temperature,
            temp_min: conditions.temp_min,
            temp_max: conditions.temp_max,
            wind_speed: conditions.wind_speed,
            condition: conditions.condition,
            aqi,
            sunrise: conditions.sunrise,
            sunset: conditions.sunset,
            hourly: forecast.into_iter().take(FORECAST_POINTS).collect(),
        }
    }

    /// Zeroed snapshot whose only content is a condition label such as
    /// "Loading..." or "Error: ...".
    pub fn placeholder(condition: impl Into<String>) -> Self {
        Self {
            temperature: 0.0,
            temp_min: 0.0,
            temp_max: 0.0,
            wind_speed: 0.0,
            condition: condition.into(),
            aqi: AirQualityIndex::default(),
            sunrise: DateTime::<Utc>::UNIX_EPOCH,
            sunset: DateTime::<Utc>::UNIX_EPOCH,
            hourly: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.aqi == AirQualityIndex::default()
            && self.hourly.is_empty()
            && self.sunrise == DateTime::<Utc>::UNIX_EPOCH
    }

    pub fn is_daytime(&self, now: DateTime<Utc>) -> bool {
        self.sunrise <= now && now <= self.sunset
    }
}
