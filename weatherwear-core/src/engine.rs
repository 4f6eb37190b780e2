//! Decision logic: condition normalization, catalog filtering, per-role
//! picking, outfit assembly and extreme weather alerts.
//!
//! Everything except [`outfit::Recommender`] is a pure function of its inputs.

pub mod alert;
pub mod condition;
pub mod filter;
pub mod outfit;
pub mod picker;

pub use alert::detect;
pub use condition::normalize;
pub use filter::{filter_catalog, target_temperature};
pub use outfit::{Outlook, OutfitSlot, Recommendation, Recommender, assemble};
pub use picker::{Buckets, classify_and_pick, partition, role_for_type};
