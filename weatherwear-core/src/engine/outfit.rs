use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use anyhow::Result;
use rand::Rng;
use tracing::{debug, info};

use crate::{
    engine::{alert::detect, condition::normalize, filter, picker::classify_and_pick},
    model::{
        AlertRecord, CatalogSource, Category, ClothingItem, Coordinates, OutfitSelection,
        UnitSystem, WeatherReport, WeatherSnapshot,
    },
    provider::WeatherProvider,
    store::CatalogStore,
};

/// Result of one matching pass, with the candidate pool kept for refreshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub target_temperature: f64,
    pub category: Category,
    pub candidates: Vec<ClothingItem>,
    pub selection: OutfitSelection,
}

impl Recommendation {
    pub fn build<R: Rng + ?Sized>(
        catalog: &[ClothingItem],
        weather: &WeatherSnapshot,
        rng: &mut R,
    ) -> Self {
        let target_temperature = filter::target_temperature(weather.temperature_feels_like);
        let category = normalize(&weather.condition_text);
        let candidates = filter::filter_catalog(catalog, weather.temperature_feels_like, category);
        let selection = classify_and_pick(&candidates, rng);

        debug!(
            target_temperature,
            %category,
            catalog = catalog.len(),
            candidates = candidates.len(),
            "outfit assembled"
        );

        Self {
            target_temperature,
            category,
            candidates,
            selection,
        }
    }

    /// Re-run the picker over the same candidates.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &OutfitSelection {
        self.selection = classify_and_pick(&self.candidates, rng);
        &self.selection
    }
}

/// Fetch the catalog for `source`. A personal request without an owner reads
/// the shared catalog instead.
pub async fn load_catalog(
    store: &dyn CatalogStore,
    source: &CatalogSource,
) -> Result<Vec<ClothingItem>> {
    match source {
        CatalogSource::Shared => store.shared_items().await,
        CatalogSource::Personal {
            owner_id: Some(owner),
        } => store.personal_items(owner).await,
        CatalogSource::Personal { owner_id: None } => {
            info!("no signed-in owner, recommending from the shared catalog");
            store.shared_items().await
        }
    }
}

/// Build a recommendation for `weather` from the catalog behind `source`.
///
/// Returns `Ok(None)` when there is no snapshot yet. Store failures propagate.
pub async fn assemble<R: Rng + ?Sized>(
    store: &dyn CatalogStore,
    source: &CatalogSource,
    weather: Option<&WeatherSnapshot>,
    rng: &mut R,
) -> Result<Option<Recommendation>> {
    let Some(weather) = weather else {
        debug!("no weather snapshot yet, skipping assembly");
        return Ok(None);
    };

    let catalog = load_catalog(store, source).await?;
    Ok(Some(Recommendation::build(&catalog, weather, rng)))
}

/// Weather, alerts and outfit for one location.
#[derive(Debug, Clone)]
pub struct Outlook {
    pub report: WeatherReport,
    pub alerts: Vec<AlertRecord>,
    pub recommendation: Recommendation,
}

/// Composition of the two collaborators the engine needs.
#[derive(Debug, Clone)]
pub struct Recommender {
    weather: Arc<dyn WeatherProvider>,
    catalog: Arc<dyn CatalogStore>,
}

impl Recommender {
    pub fn new(weather: Arc<dyn WeatherProvider>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { weather, catalog }
    }

    /// Fetches weather and catalog concurrently, then matches once both are in.
    pub async fn outlook<R: Rng + ?Sized>(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
        source: &CatalogSource,
        rng: &mut R,
    ) -> Result<Outlook> {
        let (report, catalog) = tokio::try_join!(
            self.weather.report(coordinates, units),
            load_catalog(self.catalog.as_ref(), source),
        )?;

        let alerts = detect(&report.current, units);
        let recommendation = Recommendation::build(&catalog, &report.current, rng);

        Ok(Outlook {
            report,
            alerts,
            recommendation,
        })
    }
}

/// Visible outfit state where the most recently started request wins.
///
/// Callers take a ticket before starting work and publish with it; a publish
/// carrying an older ticket than the one on display is dropped.
#[derive(Debug, Default)]
pub struct OutfitSlot {
    issued: AtomicU64,
    shown: Mutex<Option<(u64, OutfitSelection)>>,
}

impl OutfitSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns whether `selection` became visible.
    pub fn publish(&self, ticket: u64, selection: OutfitSelection) -> bool {
        let mut shown = self.shown.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(shown.as_ref(), Some((current, _)) if *current > ticket) {
            debug!(ticket, "dropping stale outfit");
            return false;
        }
        *shown = Some((ticket, selection));
        true
    }

    pub fn current(&self) -> Option<OutfitSelection> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, selection)| selection.clone())
    }

    pub fn clear(&self) {
        *self.shown.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
