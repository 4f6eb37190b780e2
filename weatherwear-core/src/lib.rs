//! Core library for `weatherwear`.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather and geocoding providers
//! - The wardrobe catalog store
//! - The outfit matching and extreme weather alert engine
//!
//! It is used by `weatherwear-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod engine;
pub mod model;
pub mod provider;
pub mod store;

pub use config::{Config, StoreConfig, WeatherConfig};
pub use engine::{Outlook, OutfitSlot, Recommendation, Recommender};
pub use model::{
    AlertRecord, CatalogSource, Category, ClothingItem, Coordinates, OutfitSelection, Role,
    Severity, UnitSystem, WeatherReport, WeatherSnapshot,
};
pub use provider::{Geocoder, Place, WeatherProvider};
pub use store::{CatalogStore, MemoryCatalog, NewClothingItem, RestCatalogStore, WardrobeEditor};
