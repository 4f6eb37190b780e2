//! End-to-end outfit scenarios against an in-memory catalog.

use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use weatherwear_core::{
    CatalogSource, Category, ClothingItem, MemoryCatalog, Role, WeatherSnapshot,
    engine::{assemble, filter_catalog},
};

fn item(id: i64, garment: &str, role: Role, low: f64, high: f64, tag: &str) -> ClothingItem {
    ClothingItem {
        id,
        garment_type: garment.into(),
        role,
        temp_low: low,
        temp_high: high,
        condition_tag: tag.into(),
        image_reference: None,
        color: None,
        owner: None,
        favorited: false,
    }
}

fn weather(feels_like: f64, condition: &str) -> WeatherSnapshot {
    WeatherSnapshot {
        observed_at: Utc::now(),
        temperature: feels_like + 2.0,
        temperature_feels_like: feels_like,
        condition_text: condition.into(),
        description: String::new(),
        humidity_pct: 55,
        precipitation_probability: 0.2,
        uv_index: 1.0,
        wind_speed: 5.0,
        visibility_meters: 10_000.0,
    }
}

#[tokio::test]
async fn hoodie_matches_and_shorts_are_too_warm() {
    let store = MemoryCatalog::with_shared(vec![
        item(1, "Hoodie", Role::Top, 30.0, 60.0, "all"),
        item(2, "Shorts", Role::Bottom, 70.0, 100.0, "clear"),
    ]);
    let snapshot = weather(45.0, "Clouds");

    let rec = assemble(&store, &CatalogSource::Shared, Some(&snapshot), &mut StdRng::seed_from_u64(1))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(rec.selection.top.map(|i| i.garment_type), Some("Hoodie".to_string()));
    assert!(rec.selection.bottom.is_none());
    assert!(rec.selection.accessory.is_none());
}

#[tokio::test]
async fn personal_request_without_owner_reads_shared_catalog() {
    let store = MemoryCatalog::with_shared(vec![
        item(1, "Hoodie", Role::Top, 30.0, 60.0, "all"),
        item(2, "Jeans", Role::Bottom, 30.0, 60.0, "all"),
        item(3, "Jacket", Role::Accessory, 30.0, 60.0, "clouds"),
    ]);
    let mut orphan = item(99, "Polo", Role::Top, 30.0, 60.0, "all");
    orphan.owner = Some("someone-else".into());
    store.insert_personal(orphan);

    let snapshot = weather(50.0, "Overcast");
    let rec = assemble(
        &store,
        &CatalogSource::Personal { owner_id: None },
        Some(&snapshot),
        &mut StdRng::seed_from_u64(2),
    )
    .await
    .unwrap()
    .unwrap();

    let mut ids: Vec<i64> = rec.candidates.iter().map(|i| i.id).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(rec.selection.top.map(|i| i.id), Some(1));
    assert_eq!(rec.selection.bottom.map(|i| i.id), Some(2));
    assert_eq!(rec.selection.accessory.map(|i| i.id), Some(3));
}

#[test]
fn two_stage_fallback_keeps_wildcard_item() {
    let catalog = vec![
        item(1, "Shorts", Role::Bottom, 70.0, 100.0, "clear"),
        item(2, "Winter Coat", Role::Accessory, -30.0, 20.0, "all"),
        item(3, "Tank-Top", Role::Top, 80.0, 110.0, "rain"),
    ];

    let pool = filter_catalog(&catalog, 45.0, Category::Clouds);
    let ids: Vec<i64> = pool.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn rainy_day_prefers_rain_gear() {
    let store = MemoryCatalog::with_shared(vec![
        item(1, "Rain Jacket", Role::Accessory, 40.0, 70.0, "rain"),
        item(2, "Hat", Role::Accessory, 40.0, 70.0, "clear"),
        item(3, "Sweatshirt", Role::Top, 40.0, 70.0, "rainy"),
        item(4, "Sweatpants", Role::Bottom, 40.0, 70.0, "all"),
    ]);
    let snapshot = weather(55.4, "Drizzle");

    for seed in 0..10 {
        let rec = assemble(&store, &CatalogSource::Shared, Some(&snapshot), &mut StdRng::seed_from_u64(seed))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rec.category, Category::Rain);
        assert_eq!(rec.selection.accessory.as_ref().map(|i| i.id), Some(1));
        assert_eq!(rec.selection.top.as_ref().map(|i| i.id), Some(3));
        assert_eq!(rec.selection.bottom.as_ref().map(|i| i.id), Some(4));
    }
}

#[tokio::test]
async fn inverted_range_is_never_recommended_through_fallback() {
    let store = MemoryCatalog::with_shared(vec![
        item(1, "Hoodie", Role::Top, 30.0, 60.0, "all"),
        item(2, "Jeans", Role::Bottom, 80.0, 40.0, "all"),
    ]);
    let snapshot = weather(70.0, "Clear");

    for seed in 0..20 {
        let rec = assemble(&store, &CatalogSource::Shared, Some(&snapshot), &mut StdRng::seed_from_u64(seed))
            .await
            .unwrap()
            .unwrap();
        assert!(rec.candidates.iter().all(|i| i.id != 2));
        assert_eq!(rec.selection.top.as_ref().map(|i| i.id), Some(1));
        assert!(rec.selection.bottom.is_none());
    }
}
