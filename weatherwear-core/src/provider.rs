use crate::{
    Config,
    model::{Coordinates, UnitSystem, WeatherReport},
    provider::openweather::OpenWeatherProvider,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions, hourly and daily forecast and UV index for one point.
    async fn report(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> anyhow::Result<WeatherReport>;
}

/// A resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub coordinates: Coordinates,
    pub name: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Free text or a postal code to coordinates.
    async fn resolve(&self, query: &str) -> anyhow::Result<Place>;

    /// Coordinates to a display name such as "Boston, Massachusetts".
    async fn place_name(&self, coordinates: Coordinates) -> anyhow::Result<String>;
}

/// What the user typed for a location.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Coordinates(Coordinates),
    Query(String),
}

impl Location {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(anyhow!("Location name or zip code is required."));
        }

        Ok(match input.parse::<Coordinates>() {
            Ok(coordinates) => Location::Coordinates(coordinates),
            Err(_) => Location::Query(input.to_string()),
        })
    }
}

/// Turn user input into coordinates plus a display name.
pub async fn locate(geocoder: &dyn Geocoder, input: &str) -> anyhow::Result<Place> {
    match Location::parse(input)? {
        Location::Coordinates(coordinates) => {
            let name = geocoder.place_name(coordinates).await?;
            Ok(Place { coordinates, name })
        }
        Location::Query(query) => geocoder.resolve(&query).await,
    }
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.weather_api_key()?;
    Ok(OpenWeatherProvider::new(api_key.to_owned()))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
