use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use mausam_core::{
    AppState, Units, WeatherSnapshot,
    display::{Scene, condition_icon, wind_kmh},
};

pub fn state(state: &AppState, units: Units, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", state.location);
    out.push_str(&snapshot(&state.snapshot, units, now));
    if let Some(err) = &state.error {
        let _ = writeln!(out, "\n! {err}");
    }
    out
}

pub fn snapshot(s: &WeatherSnapshot, units: Units, now: DateTime<Utc>) -> String {
    let deg = units.temperature_symbol();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}{deg}  {} {}",
        s.temperature.round(),
        condition_icon(&s.condition),
        s.condition
    );
    if s.is_placeholder() {
        return out;
    }

    let scene = Scene::select(&s.condition, s.is_daytime(now), s.temperature);
    let _ = writeln!(
        out,
        "Min: {}{deg}  Max: {}{deg}  ({scene:?})",
        s.temp_min.round(),
        s.temp_max.round()
    );
    let _ = writeln!(out, "Wind: {}", wind(s.wind_speed, units));
    let _ = writeln!(
        out,
        "AQI: {} ({}){}",
        s.aqi.value(),
        s.aqi.level(),
        if s.aqi.is_good() { "" } else { " !" }
    );
    let _ = writeln!(
        out,
        "Sunrise {}  Sunset {}",
        s.sunrise.with_timezone(&Local).format("%H:%M"),
        s.sunset.with_timezone(&Local).format("%H:%M")
    );

    if !s.hourly.is_empty() {
        out.push_str("\nForecast\n");
        for point in &s.hourly {
            let _ = writeln!(
                out,
                "  {}  {} {}{deg}  {}",
                point.time.with_timezone(&Local).format("%H:%M"),
                condition_icon(&point.condition),
                point.temperature.round(),
                point.condition
            );
        }
    }
    out
}

pub fn suggestions(state: &AppState) -> String {
    let mut out = String::new();
    for (i, place) in state.suggestions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, place.label());
    }
    out
}

pub fn json(state: &AppState) -> anyhow::Result<String> {
    let value = serde_json::json!({
        "phase": format!("{:?}", state.phase),
        "location": state.location,
        "snapshot": state.snapshot,
        "error": state.error,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn wind(speed: f64, units: Units) -> String {
    match units {
        Units::Metric => format!("{} km/h", wind_kmh(speed).round()),
        Units::Imperial => format!("{} mph", speed.round()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mausam_core::{
        AirQualityIndex, Coordinate, CurrentConditions, HourlyPoint, PlaceCandidate,
    };

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn sample() -> WeatherSnapshot {
        WeatherSnapshot::merge(
            CurrentConditions {
                temperature: 24.6,
                temp_min: 20.2,
                temp_max: 29.7,
                wind_speed: 5.0,
                condition: "Rain".into(),
                sunrise: at(1_700_000_000),
                sunset: at(1_700_040_000),
            },
            vec![HourlyPoint {
                time: at(1_700_010_800),
                temperature: 26.0,
                condition: "Clear".into(),
            }],
            AirQualityIndex(4),
        )
    }

    #[test]
    fn renders_full_snapshot() {
        let text = snapshot(&sample(), Units::Metric, at(1_700_020_000));

        assert!(text.starts_with("25°C  🌧️ Rain"), "{text}");
        assert!(text.contains("Min: 20°C  Max: 30°C  (Rainy)"), "{text}");
        assert!(text.contains("Wind: 18 km/h"), "{text}");
        assert!(text.contains("AQI: 4 (Poor) !"), "{text}");
        assert!(text.contains("☀️ 26°C  Clear"), "{text}");
    }

    #[test]
    fn imperial_wind_is_not_converted() {
        let text = snapshot(&sample(), Units::Imperial, at(1_700_020_000));
        assert!(text.contains("Wind: 5 mph"), "{text}");
        assert!(text.contains("°F"), "{text}");
    }

    #[test]
    fn placeholder_renders_only_label() {
        let placeholder = WeatherSnapshot::placeholder("Error: timeout");
        let text = snapshot(&placeholder, Units::Metric, at(0));
        assert_eq!(text, "0°C  🌤️ Error: timeout\n");
    }

    #[test]
    fn state_includes_banner() {
        let app_state = AppState {
            error: Some("Location Not Found".into()),
            ..AppState::default()
        };
        let text = state(&app_state, Units::Metric, at(0));
        assert!(text.starts_with("Fetching Location...\n"));
        assert!(text.ends_with("! Location Not Found\n"));
    }

    #[test]
    fn suggestions_are_numbered() {
        let state = AppState {
            suggestions: vec![PlaceCandidate {
                name: "Delhi".into(),
                state: None,
                country: "IN".into(),
                coordinate: Coordinate::new(28.6, 77.2),
            }],
            ..AppState::default()
        };
        assert_eq!(suggestions(&state), "1. Delhi, IN\n");
    }

    #[test]
    fn json_carries_snapshot() {
        let text = json(&AppState::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["phase"], "Idle");
        assert_eq!(value["snapshot"]["condition"], "Loading...");
    }
}
