use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};
use weatherwear_core::{
    CatalogStore, ClothingItem, Config, NewClothingItem, OutfitSlot, Recommender, Role, UnitSystem,
    WardrobeEditor, WeatherProvider,
    engine::{detect, role_for_type},
    provider::{locate, provider_from_config},
    store::store_from_config,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weatherwear",
    version,
    about = "Weather-aware outfit recommendations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure API keys, the wardrobe store, units and defaults.
    Configure,

    /// Show current weather, forecast and extreme weather alerts.
    Weather {
        /// Place name, 5-digit zip code or "lat,lon". Defaults to the configured location.
        location: Option<String>,

        /// Override the configured unit system.
        #[arg(long)]
        units: Option<UnitSystem>,
    },

    /// Recommend a top, bottom and accessory for the current weather.
    Outfit {
        /// Place name, 5-digit zip code or "lat,lon". Defaults to the configured location.
        location: Option<String>,

        /// Override the configured unit system.
        #[arg(long)]
        units: Option<UnitSystem>,

        /// Pick from your personal wardrobe instead of the shared one.
        #[arg(long)]
        personal: bool,

        /// Print this many alternative picks for the same weather.
        #[arg(long, default_value_t = 0)]
        refresh: u8,
    },

    /// Manage your personal wardrobe.
    Wardrobe {
        #[command(subcommand)]
        action: WardrobeAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum WardrobeAction {
    /// List your items.
    List,

    /// Add an item.
    #[command(allow_negative_numbers = true)]
    Add {
        /// Garment label, e.g. "Hoodie" or "Rain Jacket".
        garment_type: String,

        /// top, bottom or other. Inferred from the garment type when omitted.
        #[arg(long)]
        role: Option<Role>,

        /// Lowest feels-like temperature the item is worn at.
        #[arg(long)]
        low: f64,

        /// Highest feels-like temperature the item is worn at.
        #[arg(long)]
        high: f64,

        /// rain, snow, clouds, clear or all.
        #[arg(long, default_value = "all")]
        condition: String,

        #[arg(long)]
        image: Option<String>,

        /// Fill color applied to vector images.
        #[arg(long)]
        color: Option<String>,
    },

    /// Change an existing item. Fields not given keep their current value.
    #[command(allow_negative_numbers = true)]
    Edit {
        id: i64,

        #[command(flatten)]
        changes: ItemChanges,
    },

    /// Remove an item by id.
    Remove { id: i64 },

    /// Mark an item as a favorite.
    Favorite {
        id: i64,

        /// Clear the favorite flag instead.
        #[arg(long)]
        off: bool,
    },
}

#[derive(Debug, Default, Args)]
pub struct ItemChanges {
    /// New garment label.
    #[arg(long = "type")]
    pub garment_type: Option<String>,

    /// top, bottom or other. Re-inferred when only the type changes.
    #[arg(long)]
    pub role: Option<Role>,

    #[arg(long)]
    pub low: Option<f64>,

    #[arg(long)]
    pub high: Option<f64>,

    #[arg(long)]
    pub condition: Option<String>,

    #[arg(long)]
    pub image: Option<String>,

    #[arg(long)]
    pub color: Option<String>,
}

impl ItemChanges {
    /// Overlay the given flags on `existing`.
    fn apply(self, existing: &ClothingItem) -> NewClothingItem {
        let role = match (self.role, &self.garment_type) {
            (Some(role), _) => role,
            (None, Some(garment)) => role_for_type(garment).unwrap_or(existing.role),
            (None, None) => existing.role,
        };

        NewClothingItem {
            garment_type: self.garment_type.unwrap_or_else(|| existing.garment_type.clone()),
            role,
            temp_low: self.low.unwrap_or(existing.temp_low),
            temp_high: self.high.unwrap_or(existing.temp_high),
            condition_tag: self.condition.unwrap_or_else(|| existing.condition_tag.clone()),
            image_reference: self.image.or_else(|| existing.image_reference.clone()),
            color: self.color.or_else(|| existing.color.clone()),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Weather { location, units } => {
                let units = units.unwrap_or(config.units);
                let provider = provider_from_config(&config)?;
                let place = locate(&provider, &location_input(location, &config)?).await?;

                let report = provider.report(place.coordinates, units).await?;
                let alerts = detect(&report.current, units);

                output::print_weather(&place, &report);
                output::print_alerts(&alerts);
                Ok(())
            }
            Command::Outfit {
                location,
                units,
                personal,
                refresh,
            } => {
                let units = units.unwrap_or(config.units);
                let provider = Arc::new(provider_from_config(&config)?);
                let store: Arc<dyn CatalogStore> = Arc::new(store_from_config(&config)?);
                let place = locate(provider.as_ref(), &location_input(location, &config)?).await?;

                let source = config.catalog_source(personal);
                let recommender = Recommender::new(provider, store);
                let mut rng = StdRng::from_entropy();
                let slot = OutfitSlot::new();

                let ticket = slot.ticket();
                let mut outlook = recommender
                    .outlook(place.coordinates, units, &source, &mut rng)
                    .await?;
                slot.publish(ticket, outlook.recommendation.selection.clone());

                output::print_conditions(&place, &outlook.report);
                output::print_alerts(&outlook.alerts);
                output::print_outfit(&outlook.recommendation, slot.current().as_ref());

                for round in 1..=refresh {
                    let ticket = slot.ticket();
                    let selection = outlook.recommendation.reshuffle(&mut rng).clone();
                    slot.publish(ticket, selection);
                    debug!(round, "reshuffled outfit");

                    println!();
                    println!("Alternative #{round}:");
                    output::print_selection(slot.current().as_ref());
                }
                Ok(())
            }
            Command::Wardrobe { action } => wardrobe(action, &config).await,
        }
    }
}

fn location_input(location: Option<String>, config: &Config) -> anyhow::Result<String> {
    location
        .or_else(|| config.default_location.clone())
        .ok_or_else(|| {
            anyhow!(
                "No location given.\n\
                 Hint: pass a location or set a default with `weatherwear configure`."
            )
        })
}

fn signed_in_owner(config: &Config) -> anyhow::Result<&str> {
    config.owner_id.as_deref().ok_or_else(|| {
        anyhow!(
            "No wardrobe owner configured.\n\
             Hint: run `weatherwear configure` and enter your user id."
        )
    })
}

async fn wardrobe(action: WardrobeAction, config: &Config) -> anyhow::Result<()> {
    let owner = signed_in_owner(config)?;
    let store = store_from_config(config)?;

    match action {
        WardrobeAction::List => {
            let items = store.personal_items(owner).await?;
            output::print_wardrobe(&items);
        }
        WardrobeAction::Add {
            garment_type,
            role,
            low,
            high,
            condition,
            image,
            color,
        } => {
            let role = role.or_else(|| role_for_type(&garment_type)).ok_or_else(|| {
                anyhow!("Cannot infer a role for '{garment_type}'. Pass --role top|bottom|other.")
            })?;

            let item = store
                .add_item(
                    owner,
                    NewClothingItem {
                        garment_type,
                        role,
                        temp_low: low,
                        temp_high: high,
                        condition_tag: condition,
                        image_reference: image,
                        color,
                    },
                )
                .await?;
            info!(id = item.id, "added wardrobe item");
            println!("Added #{} {} ({})", item.id, item.garment_type, item.role);
        }
        WardrobeAction::Edit { id, changes } => {
            let items = store.personal_items(owner).await?;
            let existing = items
                .iter()
                .find(|item| item.id == id)
                .ok_or_else(|| anyhow!("No wardrobe item {id} found for this owner"))?;

            let item = store.update_item(owner, id, changes.apply(existing)).await?;
            info!(id, "updated wardrobe item");
            println!("Updated #{} {} ({})", item.id, item.garment_type, item.role);
        }
        WardrobeAction::Remove { id } => {
            store.remove_item(owner, id).await?;
            println!("Removed #{id}");
        }
        WardrobeAction::Favorite { id, off } => {
            store.set_favorite(owner, id, !off).await?;
            println!("#{id} {}", if off { "unfavorited" } else { "favorited" });
        }
    }
    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = Password::new("OpenWeather API key (leave empty to keep current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    if !key.trim().is_empty() {
        config.set_weather_api_key(key.trim().to_string());
    }

    let current_url = config.store.as_ref().map(|s| s.url.clone()).unwrap_or_default();
    let url = Text::new("Wardrobe store URL:")
        .with_initial_value(&current_url)
        .prompt()?;
    let store_key = Password::new("Wardrobe store anon key (leave empty to keep current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    let store_key = match (store_key.trim(), config.store.as_ref()) {
        ("", Some(existing)) => existing.api_key.clone(),
        (entered, _) => entered.to_string(),
    };
    if !url.trim().is_empty() && !store_key.is_empty() {
        config.set_store(url.trim().to_string(), store_key);
    }

    let units = UnitSystem::all();
    let cursor = units.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", units.to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;

    let location = Text::new("Default location (name, zip or lat,lon):")
        .with_initial_value(config.default_location.as_deref().unwrap_or_default())
        .prompt()?;
    config.default_location = Some(location.trim().to_string()).filter(|l| !l.is_empty());

    let owner = Text::new("Wardrobe user id (leave empty to sign out):")
        .with_initial_value(config.owner_id.as_deref().unwrap_or_default())
        .prompt()?;
    config.set_owner(Some(owner));

    config.save().context("Failed to save configuration")?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outfit_flags_parse() {
        let cli = Cli::try_parse_from([
            "weatherwear", "outfit", "02139", "--units", "metric", "--personal", "--refresh", "2",
        ])
        .unwrap();

        match cli.command {
            Command::Outfit {
                location,
                units,
                personal,
                refresh,
            } => {
                assert_eq!(location.as_deref(), Some("02139"));
                assert_eq!(units, Some(UnitSystem::Metric));
                assert!(personal);
                assert_eq!(refresh, 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn wardrobe_add_accepts_negative_range() {
        let cli = Cli::try_parse_from([
            "weatherwear", "wardrobe", "add", "Winter Coat", "--low", "-20", "--high", "35",
            "--condition", "snow",
        ])
        .unwrap();

        match cli.command {
            Command::Wardrobe {
                action: WardrobeAction::Add { low, high, role, .. },
            } => {
                assert_eq!(low, -20.0);
                assert_eq!(high, 35.0);
                assert!(role.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn wardrobe_edit_takes_partial_changes() {
        let cli = Cli::try_parse_from([
            "weatherwear", "wardrobe", "edit", "12", "--low", "-5", "--condition", "snow",
        ])
        .unwrap();

        match cli.command {
            Command::Wardrobe {
                action: WardrobeAction::Edit { id, changes },
            } => {
                assert_eq!(id, 12);
                assert_eq!(changes.low, Some(-5.0));
                assert_eq!(changes.condition.as_deref(), Some("snow"));
                assert!(changes.high.is_none());
                assert!(changes.garment_type.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn stored() -> ClothingItem {
        ClothingItem {
            id: 12,
            garment_type: "Polo".into(),
            role: Role::Top,
            temp_low: 55.0,
            temp_high: 80.0,
            condition_tag: "clear".into(),
            image_reference: Some("polo.svg".into()),
            color: Some("#ffffff".into()),
            owner: Some("alex".into()),
            favorited: true,
        }
    }

    #[test]
    fn changes_overlay_existing_item() {
        let changes = ItemChanges {
            high: Some(85.0),
            color: Some("#000000".into()),
            ..ItemChanges::default()
        };
        let updated = changes.apply(&stored());

        assert_eq!(updated.garment_type, "Polo");
        assert_eq!(updated.role, Role::Top);
        assert_eq!((updated.temp_low, updated.temp_high), (55.0, 85.0));
        assert_eq!(updated.condition_tag, "clear");
        assert_eq!(updated.image_reference.as_deref(), Some("polo.svg"));
        assert_eq!(updated.color.as_deref(), Some("#000000"));
    }

    #[test]
    fn new_type_reinfers_role_unless_given() {
        let renamed = ItemChanges {
            garment_type: Some("Shorts".into()),
            ..ItemChanges::default()
        };
        assert_eq!(renamed.apply(&stored()).role, Role::Bottom);

        let explicit = ItemChanges {
            garment_type: Some("Shorts".into()),
            role: Some(Role::Accessory),
            ..ItemChanges::default()
        };
        assert_eq!(explicit.apply(&stored()).role, Role::Accessory);

        let unknown = ItemChanges {
            garment_type: Some("Sandals".into()),
            ..ItemChanges::default()
        };
        assert_eq!(unknown.apply(&stored()).role, Role::Top);
    }

    #[test]
    fn bad_units_are_rejected() {
        assert!(Cli::try_parse_from(["weatherwear", "weather", "--units", "kelvin"]).is_err());
    }

    #[test]
    fn location_falls_back_to_default() {
        let mut config = Config::default();
        assert!(location_input(None, &config).is_err());

        config.default_location = Some("Austin, TX".into());
        assert_eq!(location_input(None, &config).unwrap(), "Austin, TX");
        assert_eq!(location_input(Some("02139".into()), &config).unwrap(), "02139");
    }

    #[test]
    fn wardrobe_requires_owner() {
        let err = signed_in_owner(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No wardrobe owner configured"));
    }
}
