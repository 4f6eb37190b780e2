use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::{CatalogSource, UnitSystem};

/// OpenWeather credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: String,
}

/// Hosted wardrobe store: REST base URL and anon key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// units = "imperial"
/// default_location = "02139"
///
/// [weather]
/// api_key = "..."
///
/// [store]
/// url = "https://xyz.supabase.co"
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub units: UnitSystem,

    pub default_location: Option<String>,

    /// Identity of the signed-in wardrobe owner, if any.
    pub owner_id: Option<String>,

    pub weather: Option<WeatherConfig>,

    pub store: Option<StoreConfig>,
}

impl Config {
    pub fn weather_api_key(&self) -> Result<&str> {
        self.weather
            .as_ref()
            .map(|w| w.api_key.as_str())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weatherwear configure` and enter your API key."
                )
            })
    }

    pub fn store_config(&self) -> Result<&StoreConfig> {
        self.store.as_ref().ok_or_else(|| {
            anyhow!(
                "No wardrobe store configured.\n\
                 Hint: run `weatherwear configure` and enter the store URL and key."
            )
        })
    }

    pub fn set_weather_api_key(&mut self, api_key: String) {
        self.weather = Some(WeatherConfig { api_key });
    }

    pub fn set_store(&mut self, url: String, api_key: String) {
        self.store = Some(StoreConfig { url, api_key });
    }

    pub fn set_owner(&mut self, owner_id: Option<String>) {
        self.owner_id = owner_id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty());
    }

    /// Which catalog an outfit request should read.
    pub fn catalog_source(&self, personal: bool) -> CatalogSource {
        if personal {
            CatalogSource::Personal {
                owner_id: self.owner_id.clone(),
            }
        } else {
            CatalogSource::Shared
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherwear", "weatherwear")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.weather_api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("weatherwear configure"));
    }

    #[test]
    fn empty_weather_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_weather_api_key(String::new());
        assert!(cfg.weather_api_key().is_err());

        cfg.set_weather_api_key("OW_KEY".into());
        assert_eq!(cfg.weather_api_key().unwrap(), "OW_KEY");
    }

    #[test]
    fn default_units_are_imperial() {
        assert_eq!(Config::default().units, UnitSystem::Imperial);
        assert_eq!(Config::from_toml("").unwrap().units, UnitSystem::Imperial);
    }

    #[test]
    fn toml_roundtrip_keeps_everything() {
        let mut cfg = Config {
            units: UnitSystem::Metric,
            default_location: Some("02139".into()),
            ..Config::default()
        };
        cfg.set_weather_api_key("OW_KEY".into());
        cfg.set_store("https://xyz.supabase.co".into(), "ANON".into());
        cfg.set_owner(Some(" user-42 ".into()));

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();

        assert_eq!(back.units, UnitSystem::Metric);
        assert_eq!(back.default_location.as_deref(), Some("02139"));
        assert_eq!(back.owner_id.as_deref(), Some("user-42"));
        assert_eq!(back.store_config().unwrap().url, "https://xyz.supabase.co");
        assert_eq!(back.weather_api_key().unwrap(), "OW_KEY");
    }

    #[test]
    fn catalog_source_follows_owner() {
        let mut cfg = Config::default();
        assert_eq!(cfg.catalog_source(false), CatalogSource::Shared);
        assert_eq!(
            cfg.catalog_source(true),
            CatalogSource::Personal { owner_id: None }
        );

        cfg.set_owner(Some("user-42".into()));
        assert_eq!(
            cfg.catalog_source(true),
            CatalogSource::Personal {
                owner_id: Some("user-42".into())
            }
        );

        cfg.set_owner(Some("   ".into()));
        assert!(cfg.owner_id.is_none());
    }
}
