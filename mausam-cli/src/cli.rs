use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{
    Confirm, CustomType, CustomUserError, Password, PasswordDisplayMode, Select,
    validator::Validation,
};
use mausam_core::{AppState, Config, Coordinate, FixedLocation, Phase, Units, WeatherApp};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "mausam", version, about = "Current weather, air quality and forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeather API key, units and home location.
    Configure,

    /// Show weather for a place name.
    Show {
        /// Place name, e.g. "Delhi" or "Paris, FR".
        place: String,

        #[command(flatten)]
        output: Output,
    },

    /// Show weather for the current location.
    Here {
        /// Latitude in degrees; defaults to the configured home location.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude in degrees.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[command(flatten)]
        output: Output,
    },

    /// List places matching partial search text.
    Suggest {
        /// At least three characters of a place name.
        text: String,
    },
}

#[derive(Debug, Args)]
pub struct Output {
    /// Print the application state as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        tracing::debug!(units = %config.units, ordering = ?config.ordering, "configuration loaded");

        match self.command {
            Command::Configure => configure(config),
            Command::Show { place, output } => {
                let app = WeatherApp::from_config(&config, Arc::new(FixedLocation(config.home)))?;
                app.search(place).await;
                finish(&app.state(), &config, &output)
            }
            Command::Here { lat, lon, output } => {
                let here = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
                    _ => config.home,
                };
                let app = WeatherApp::from_config(&config, Arc::new(FixedLocation(here)))?;
                app.permission_result(true).await;
                finish(&app.state(), &config, &output)
            }
            Command::Suggest { text } => {
                let app = WeatherApp::from_config(&config, Arc::new(FixedLocation(config.home)))?;
                app.set_search_query(text).await;
                print!("{}", render::suggestions(&app.state()));
                Ok(())
            }
        }
    }
}

fn finish(state: &AppState, config: &Config, output: &Output) -> anyhow::Result<()> {
    if output.json {
        println!("{}", render::json(state)?);
    } else {
        print!("{}", render::state(state, config.units, chrono::Utc::now()));
    }

    if let Phase::Failed(reason) = &state.phase {
        bail!("{reason}");
    }
    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("API key prompt cancelled")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    let start = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Units prompt cancelled")?;

    let set_home = Confirm::new("Set a home location for `mausam here`?")
        .with_default(config.home.is_none())
        .prompt()
        .context("Home location prompt cancelled")?;
    if set_home {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_validator(within(-90.0, 90.0))
            .prompt()
            .context("Latitude prompt cancelled")?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_validator(within(-180.0, 180.0))
            .prompt()
            .context("Longitude prompt cancelled")?;
        config.home = Some(Coordinate::new(lat, lon));
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn within(min: f64, max: f64) -> impl Fn(&f64) -> Result<Validation, CustomUserError> + Clone {
    move |v: &f64| {
        Ok(if (min..=max).contains(v) {
            Validation::Valid
        } else {
            Validation::Invalid(format!("must be between {min} and {max}").into())
        })
    }
}
