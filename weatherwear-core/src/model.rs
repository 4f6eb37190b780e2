use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit system used both for the provider request and for the wardrobe dataset.
///
/// Values are never converted between systems: a metric catalog is matched
/// against metric weather only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    #[default]
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Imperial, UnitSystem::Metric]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(anyhow!(
                "Coordinates out of range: latitude {latitude}, longitude {longitude}"
            ));
        }
        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"`.
impl FromStr for Coordinates {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = value
            .split_once(',')
            .ok_or_else(|| anyhow!("Expected 'latitude,longitude', got '{value}'"))?;

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid latitude '{}'", lat.trim()))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid longitude '{}'", lon.trim()))?;

        Coordinates::new(latitude, longitude)
    }
}

/// Current conditions used for matching and alerting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub temperature_feels_like: f64,
    /// Primary condition label as the provider spells it, e.g. "Clouds".
    pub condition_text: String,
    pub description: String,
    pub humidity_pct: u8,
    /// Probability in `[0, 1]` from the nearest forecast bucket.
    pub precipitation_probability: f64,
    pub uv_index: f64,
    pub wind_speed: f64,
    pub visibility_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition_text: String,
    pub precipitation_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: DateTime<Utc>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition_text: String,
    pub precipitation_probability: f64,
}

/// Everything one weather fetch returns for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location_name: String,
    pub units: UnitSystem,
    pub current: WeatherSnapshot,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

/// Normalized weather bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Rain,
    Snow,
    Clouds,
    Clear,
    All,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Rain => "rain",
            Category::Snow => "snow",
            Category::Clouds => "clouds",
            Category::Clear => "clear",
            Category::All => "all",
        }
    }

    pub const fn all() -> &'static [Category] {
        &[
            Category::Rain,
            Category::Snow,
            Category::Clouds,
            Category::Clear,
            Category::All,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Garment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Top,
    Bottom,
    Accessory,
}

impl Role {
    /// Spelling used by the wardrobe tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Top => "top",
            Role::Bottom => "bottom",
            Role::Accessory => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Top => "Top",
            Role::Bottom => "Bottom",
            Role::Accessory => "Accessory",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Role::Top),
            "bottom" => Ok(Role::Bottom),
            "other" | "accessory" | "accessories" | "other/accessory" => Ok(Role::Accessory),
            _ => Err(anyhow!(
                "Unknown role '{value}'. Supported roles: top, bottom, other."
            )),
        }
    }
}

/// A validated wardrobe record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: i64,
    /// Specific item label, e.g. "Hoodie" or "Rain Jacket".
    pub garment_type: String,
    pub role: Role,
    pub temp_low: f64,
    pub temp_high: f64,
    /// A normalized category name or the wildcard `"all"`.
    pub condition_tag: String,
    pub image_reference: Option<String>,
    pub color: Option<String>,
    pub owner: Option<String>,
    pub favorited: bool,
}

impl ClothingItem {
    /// Inclusive range check. An inverted range never covers anything.
    pub fn covers(&self, temperature: f64) -> bool {
        self.temp_low <= temperature && temperature <= self.temp_high
    }
}

/// One pick per role; `None` means "no match" for that slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutfitSelection {
    pub top: Option<ClothingItem>,
    pub bottom: Option<ClothingItem>,
    pub accessory: Option<ClothingItem>,
}

impl OutfitSelection {
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.accessory.is_none()
    }

    pub fn slots(&self) -> [(Role, Option<&ClothingItem>); 3] {
        [
            (Role::Top, self.top.as_ref()),
            (Role::Bottom, self.bottom.as_ref()),
            (Role::Accessory, self.accessory.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub severity: Severity,
    pub symbol: String,
    pub message: String,
}

/// Which wardrobe the recommendation draws from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogSource {
    #[default]
    Shared,
    /// Personal wardrobe of `owner_id`; with no owner the shared catalog is used.
    Personal { owner_id: Option<String> },
}
