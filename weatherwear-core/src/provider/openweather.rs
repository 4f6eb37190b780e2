use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::model::{
    Coordinates, DailyForecast, HourlyForecast, UnitSystem, WeatherReport, WeatherSnapshot,
};

use super::{Geocoder, Place, WeatherProvider, truncate_body};

const DATA_BASE_URL: &str = "https://pro.openweathermap.org/data/2.5";
const GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Current hour plus the next 24.
const HOURLY_COUNT: &str = "25";
const DAILY_COUNT: &str = "8";
/// OpenWeather omits visibility above its 10 km cap.
const MAX_VISIBILITY_METERS: f64 = 10_000.0;
/// Geocoding is restricted to this country, as postal codes are US zips.
const COUNTRY_CODE: &str = "US";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    data_base_url: String,
    geo_base_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            data_base_url: DATA_BASE_URL.to_string(),
            geo_base_url: GEO_BASE_URL.to_string(),
        }
    }

    /// Point the client at different hosts, e.g. a caching proxy or a local stub.
    pub fn with_base_urls(mut self, data_base_url: &str, geo_base_url: &str) -> Self {
        self.data_base_url = data_base_url.trim_end_matches('/').to_string();
        self.geo_base_url = geo_base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        debug!(what, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
    wind: OwWind,
    visibility: Option<f64>,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwHourlyEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwHourlyResponse {
    #[serde(default)]
    list: Vec<OwHourlyEntry>,
    city: Option<OwCity>,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct OwDailyEntry {
    dt: i64,
    temp: OwDailyTemp,
    #[serde(default)]
    weather: Vec<OwCondition>,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwDailyResponse {
    #[serde(default)]
    list: Vec<OwDailyEntry>,
}

#[derive(Debug, Deserialize)]
struct OwUvResponse {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct OwGeoPlace {
    #[serde(default)]
    name: String,
    lat: f64,
    lon: f64,
    state: Option<String>,
    #[serde(default)]
    country: String,
}

impl OwGeoPlace {
    fn display_name(&self) -> String {
        let region = self.state.as_deref().unwrap_or(&self.country);
        format!("{}, {}", self.name, region)
    }

    fn into_place(self) -> Result<Place> {
        Ok(Place {
            coordinates: Coordinates::new(self.lat, self.lon)?,
            name: self.display_name(),
        })
    }
}

fn main_condition(conditions: &[OwCondition]) -> &str {
    conditions.first().map(|c| c.main.as_str()).unwrap_or("Unknown")
}

fn build_report(
    current: OwCurrentResponse,
    hourly: OwHourlyResponse,
    daily: OwDailyResponse,
    uv: OwUvResponse,
    units: UnitSystem,
) -> WeatherReport {
    // The nearest hourly bucket carries the precipitation chance.
    let precipitation_probability = hourly.list.first().map(|h| h.pop).unwrap_or(0.0);

    let location_name = match &hourly.city {
        Some(city) if !city.country.is_empty() => format!("{}, {}", city.name, city.country),
        Some(city) => city.name.clone(),
        None => current.name.clone(),
    };

    let snapshot = WeatherSnapshot {
        observed_at: unix_to_utc(current.dt).unwrap_or_else(Utc::now),
        temperature: current.main.temp,
        temperature_feels_like: current.main.feels_like,
        condition_text: main_condition(&current.weather).to_string(),
        description: current
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_default(),
        humidity_pct: current.main.humidity,
        precipitation_probability,
        uv_index: uv.value,
        wind_speed: current.wind.speed,
        visibility_meters: current.visibility.unwrap_or(MAX_VISIBILITY_METERS),
    };

    let hourly = hourly
        .list
        .iter()
        .filter_map(|h| {
            Some(HourlyForecast {
                time: unix_to_utc(h.dt)?,
                temperature: h.main.temp,
                feels_like: h.main.feels_like,
                condition_text: main_condition(&h.weather).to_string(),
                precipitation_probability: h.pop,
            })
        })
        .collect();

    let daily = daily
        .list
        .iter()
        .filter_map(|d| {
            Some(DailyForecast {
                date: unix_to_utc(d.dt)?,
                temp_min: d.temp.min,
                temp_max: d.temp.max,
                condition_text: main_condition(&d.weather).to_string(),
                precipitation_probability: d.pop,
            })
        })
        .collect();

    WeatherReport {
        location_name,
        units,
        current: snapshot,
        hourly,
        daily,
        sunrise: current.sys.sunrise.and_then(unix_to_utc),
        sunset: current.sys.sunset.and_then(unix_to_utc),
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn report(&self, coordinates: Coordinates, units: UnitSystem) -> Result<WeatherReport> {
        let point = vec![
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
        ];
        let mut with_units = point.clone();
        with_units.push(("units", units.as_str().to_string()));
        let mut hourly_query = with_units.clone();
        hourly_query.push(("cnt", HOURLY_COUNT.to_string()));
        let mut daily_query = with_units.clone();
        daily_query.push(("cnt", DAILY_COUNT.to_string()));

        let base = &self.data_base_url;
        let (current, hourly, daily, uv) = tokio::try_join!(
            self.get_json::<OwCurrentResponse>(format!("{base}/weather"), &with_units, "current weather"),
            self.get_json::<OwHourlyResponse>(format!("{base}/forecast/hourly"), &hourly_query, "hourly forecast"),
            self.get_json::<OwDailyResponse>(format!("{base}/forecast/daily"), &daily_query, "daily forecast"),
            self.get_json::<OwUvResponse>(format!("{base}/uvi"), &point, "UV index"),
        )?;

        let report = build_report(current, hourly, daily, uv, units);
        debug!(
            location = %report.location_name,
            feels_like = report.current.temperature_feels_like,
            condition = %report.current.condition_text,
            "weather report ready"
        );
        Ok(report)
    }
}

#[async_trait]
impl Geocoder for OpenWeatherProvider {
    async fn resolve(&self, query: &str) -> Result<Place> {
        let raw = query.trim();
        if raw.is_empty() {
            return Err(anyhow!("Location name or zip code is required."));
        }

        let place = if is_postal_code(raw) {
            self.get_json::<OwGeoPlace>(
                format!("{}/zip", self.geo_base_url),
                &[("zip", format!("{raw},{COUNTRY_CODE}"))],
                "zip geocoding",
            )
            .await?
        } else {
            self.get_json::<Vec<OwGeoPlace>>(
                format!("{}/direct", self.geo_base_url),
                &[("q", direct_query(raw)), ("limit", "1".to_string())],
                "geocoding",
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Invalid location or zip code: \"{raw}\""))?
        };

        place.into_place()
    }

    async fn place_name(&self, coordinates: Coordinates) -> Result<String> {
        let places = self
            .get_json::<Vec<OwGeoPlace>>(
                format!("{}/reverse", self.geo_base_url),
                &[
                    ("lat", coordinates.latitude.to_string()),
                    ("lon", coordinates.longitude.to_string()),
                    ("limit", "1".to_string()),
                ],
                "reverse geocoding",
            )
            .await?;

        places
            .first()
            .map(OwGeoPlace::display_name)
            .ok_or_else(|| anyhow!("Location not found for the given coordinates."))
    }
}

/// Exactly five ASCII digits.
pub fn is_postal_code(query: &str) -> bool {
    let query = query.trim();
    query.len() == 5 && query.bytes().all(|b| b.is_ascii_digit())
}

/// `" Austin , TX "` becomes `"Austin,TX,US"`.
pub fn direct_query(query: &str) -> String {
    let parts: Vec<&str> = query.split(',').map(str::trim).collect();
    format!("{},{COUNTRY_CODE}", parts.join(","))
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
