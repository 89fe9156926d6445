//! Presentation hints derived from a snapshot. Front-ends decide how to draw
//! them.

use crate::model::AirQualityIndex;

/// Backdrop matching the weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Rainy,
    Cloudy,
    Winter,
    Summer,
    Night,
}

impl Scene {
    pub fn select(condition: &str, is_day: bool, temperature: f64) -> Self {
        match condition.to_lowercase().as_str() {
            "rain" | "drizzle" => Scene::Rainy,
            "clouds" => Scene::Cloudy,
            "snow" => Scene::Winter,
            "clear" if is_day => Scene::Summer,
            "clear" => Scene::Night,
            _ if temperature < 5.0 => Scene::Winter,
            _ => Scene::Cloudy,
        }
    }
}

pub fn condition_icon(condition: &str) -> &'static str {
    match condition.to_lowercase().as_str() {
        "clear" => "☀️",
        "clouds" => "☁️",
        "rain" | "drizzle" => "🌧️",
        "snow" => "❄️",
        _ => "🌤️",
    }
}

impl AirQualityIndex {
    pub fn is_good(self) -> bool {
        self.0 <= 2
    }

    pub fn level(self) -> &'static str {
        match self.0 {
            1 => "Good",
            2 => "Fair",
            3 => "Moderate",
            4 => "Poor",
            5 => "Very Poor",
            _ => "Unknown",
        }
    }
}

/// Metres per second to kilometres per hour.
pub fn wind_kmh(mps: f64) -> f64 {
    mps * 3.6
}
