use tracing::debug;

use crate::model::{Category, ClothingItem};

/// Condition tag that matches every category.
pub const WILDCARD_TAG: &str = "all";

/// Rounds a feels-like reading to the whole degree used for matching.
///
/// Half values round away from zero (`44.5 -> 45`, `-0.5 -> -1`).
pub fn target_temperature(feels_like: f64) -> f64 {
    feels_like.round()
}

/// Select the wearable subset of `catalog`.
///
/// Items whose range contains the rounded target are kept; if none do, every
/// item with a well-formed range becomes the pool. The pool is then narrowed
/// by condition. Items with `temp_low > temp_high` never make it through.
pub fn filter_catalog(
    catalog: &[ClothingItem],
    feels_like: f64,
    category: Category,
) -> Vec<ClothingItem> {
    let target = target_temperature(feels_like);

    let in_range: Vec<&ClothingItem> = catalog.iter().filter(|i| i.covers(target)).collect();
    let pool = if in_range.is_empty() {
        debug!(target_temp = target, items = catalog.len(), "no item covers target, using full catalog");
        catalog.iter().filter(|i| i.temp_low <= i.temp_high).collect()
    } else {
        in_range
    };

    pool.into_iter()
        .filter(|item| condition_matches(&item.condition_tag, category))
        .cloned()
        .collect()
}

/// Wildcard, or substring containment in either direction.
pub fn condition_matches(tag: &str, category: Category) -> bool {
    let tag = tag.trim().to_ascii_lowercase();
    if tag == WILDCARD_TAG {
        return true;
    }
    if tag.is_empty() {
        return false;
    }

    let category = category.as_str();
    category.contains(tag.as_str()) || tag.contains(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use proptest::prelude::*;

    fn item(id: i64, garment: &str, low: f64, high: f64, tag: &str) -> ClothingItem {
        ClothingItem {
            id,
            garment_type: garment.into(),
            role: Role::Top,
            temp_low: low,
            temp_high: high,
            condition_tag: tag.into(),
            image_reference: None,
            color: None,
            owner: None,
            favorited: false,
        }
    }

    fn ids(items: &[ClothingItem]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn keeps_items_in_range_with_matching_condition() {
        let catalog = vec![
            item(1, "Hoodie", 30.0, 60.0, "all"),
            item(2, "T-Shirt", 30.0, 60.0, "clear"),
            item(3, "Jeans", 30.0, 60.0, "clouds"),
            item(4, "Shorts", 70.0, 100.0, "clouds"),
        ];

        let result = filter_catalog(&catalog, 45.0, Category::Clouds);
        assert_eq!(ids(&result), vec![1, 3]);
    }

    #[test]
    fn bounds_are_inclusive_after_rounding() {
        let catalog = vec![item(1, "Hoodie", 45.0, 60.0, "all")];

        assert_eq!(ids(&filter_catalog(&catalog, 44.5, Category::Clear)), vec![1]);
        assert_eq!(ids(&filter_catalog(&catalog, 60.4, Category::Clear)), vec![1]);

        // Falls back to the whole catalog, which still contains the item.
        let fallback = filter_catalog(&catalog, 44.4, Category::Clear);
        assert_eq!(ids(&fallback), vec![1]);
    }

    #[test]
    fn falls_back_to_full_catalog_when_nothing_in_range() {
        let catalog = vec![
            item(1, "Shorts", 70.0, 100.0, "clear"),
            item(2, "Winter Coat", -20.0, 20.0, "all"),
            item(3, "Polo", 75.0, 95.0, "rain"),
        ];

        let result = filter_catalog(&catalog, 45.0, Category::Clouds);
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn fallback_skips_inverted_ranges() {
        let catalog = vec![
            item(1, "Hoodie", 30.0, 60.0, "all"),
            item(2, "Jeans", 80.0, 40.0, "all"),
        ];

        let result = filter_catalog(&catalog, 70.0, Category::Clear);
        assert_eq!(ids(&result), vec![1]);

        let only_inverted = vec![item(2, "Jeans", 80.0, 40.0, "all")];
        assert!(filter_catalog(&only_inverted, 60.0, Category::Clear).is_empty());
    }

    #[test]
    fn fallback_does_not_apply_when_range_matches_but_condition_does_not() {
        let catalog = vec![
            item(1, "Shorts", 40.0, 50.0, "clear"),
            item(2, "Hoodie", 70.0, 90.0, "all"),
        ];

        assert!(filter_catalog(&catalog, 45.0, Category::Rain).is_empty());
    }

    #[test]
    fn empty_catalog_yields_empty() {
        assert!(filter_catalog(&[], 50.0, Category::Clear).is_empty());
    }

    #[test]
    fn condition_matching_is_bidirectional() {
        assert!(condition_matches("rain", Category::Rain));
        assert!(condition_matches("rainy", Category::Rain));
        assert!(condition_matches("Cloud", Category::Clouds));
        assert!(condition_matches("ALL", Category::Snow));
        assert!(!condition_matches("snow", Category::Rain));
        assert!(!condition_matches("", Category::Clear));
        assert!(!condition_matches("rain", Category::All));
    }

    proptest! {
        #[test]
        fn wildcard_item_in_range_always_kept(
            low in -40i32..100,
            span in 0i32..60,
            offset in 0i32..60,
            category_idx in 0usize..5,
        ) {
            let high = low + span;
            let target = (low + offset.min(span)) as f64;
            let category = Category::all()[category_idx];
            let catalog = vec![item(7, "Hoodie", low as f64, high as f64, "all")];

            let result = filter_catalog(&catalog, target, category);
            prop_assert_eq!(ids(&result), vec![7]);
        }

        #[test]
        fn inverted_item_never_survives(
            high in -40i32..100,
            gap in 1i32..60,
            target in -60i32..160,
            category_idx in 0usize..5,
        ) {
            let catalog = vec![
                item(1, "Hoodie", 200.0, 300.0, "all"),
                item(2, "Jeans", (high + gap) as f64, high as f64, "all"),
            ];
            let result = filter_catalog(&catalog, target as f64, Category::all()[category_idx]);
            prop_assert!(!ids(&result).contains(&2));
        }
    }
}
