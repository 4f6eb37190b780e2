use rand::{Rng, seq::SliceRandom};

use crate::model::{ClothingItem, OutfitSelection, Role};

pub const TOP_TYPES: &[&str] = &[
    "sweatshirt",
    "t-shirt",
    "polo",
    "tank-top",
    "button-up",
    "hoodie",
];

pub const BOTTOM_TYPES: &[&str] = &["jeans", "sweatpants", "shorts"];

/// Outerwear, one-pieces and add-ons. Must stay disjoint from the two tables above.
pub const ACCESSORY_TYPES: &[&str] = &[
    "rain jacket",
    "rainjacket",
    "jacket",
    "winter coat",
    "overalls",
    "jumpsuit",
    "hat",
    "glasses",
    "sunglasses",
    "scarf",
    "gloves",
    "umbrella",
];

/// Role of a garment label, or `None` when it is in no table.
pub fn role_for_type(garment_type: &str) -> Option<Role> {
    let key = garment_type.trim().to_ascii_lowercase();
    let key = key.as_str();

    if TOP_TYPES.contains(&key) {
        Some(Role::Top)
    } else if BOTTOM_TYPES.contains(&key) {
        Some(Role::Bottom)
    } else if ACCESSORY_TYPES.contains(&key) {
        Some(Role::Accessory)
    } else {
        None
    }
}

/// Candidates grouped by role.
#[derive(Debug, Default)]
pub struct Buckets<'a> {
    pub top: Vec<&'a ClothingItem>,
    pub bottom: Vec<&'a ClothingItem>,
    pub accessory: Vec<&'a ClothingItem>,
    /// Items whose type appears in no table.
    pub unassigned: Vec<&'a ClothingItem>,
}

pub fn partition(items: &[ClothingItem]) -> Buckets<'_> {
    let mut buckets = Buckets::default();
    for item in items {
        match role_for_type(&item.garment_type) {
            Some(Role::Top) => buckets.top.push(item),
            Some(Role::Bottom) => buckets.bottom.push(item),
            Some(Role::Accessory) => buckets.accessory.push(item),
            None => buckets.unassigned.push(item),
        }
    }
    buckets
}

/// Pick one item per role, uniformly at random within each bucket.
pub fn classify_and_pick<R: Rng + ?Sized>(filtered: &[ClothingItem], rng: &mut R) -> OutfitSelection {
    let buckets = partition(filtered);
    let mut pick = |bucket: &[&ClothingItem]| bucket.choose(&mut *rng).map(|item| (*item).clone());

    OutfitSelection {
        top: pick(&buckets.top),
        bottom: pick(&buckets.bottom),
        accessory: pick(&buckets.accessory),
    }
}
