use crate::model::Category;

// Checked in order; the first group with a hit wins.
const RAIN_KEYWORDS: &[&str] = &["rain", "drizzle", "thunderstorm"];
const SNOW_KEYWORDS: &[&str] = &["snow"];
const CLOUD_KEYWORDS: &[&str] = &["cloud", "clouds", "overcast"];
const CLEAR_KEYWORDS: &[&str] = &["clear", "sun"];

/// Map a free-text provider condition onto a [`Category`].
///
/// Total: anything unrecognized becomes [`Category::All`].
pub fn normalize(condition_text: &str) -> Category {
    let text = condition_text.to_ascii_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if mentions(RAIN_KEYWORDS) {
        Category::Rain
    } else if mentions(SNOW_KEYWORDS) {
        Category::Snow
    } else if mentions(CLOUD_KEYWORDS) {
        Category::Clouds
    } else if mentions(CLEAR_KEYWORDS) {
        Category::Clear
    } else {
        Category::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn provider_labels() {
        assert_eq!(normalize("Rain"), Category::Rain);
        assert_eq!(normalize("Drizzle"), Category::Rain);
        assert_eq!(normalize("Thunderstorm"), Category::Rain);
        assert_eq!(normalize("Snow"), Category::Snow);
        assert_eq!(normalize("Clouds"), Category::Clouds);
        assert_eq!(normalize("overcast clouds"), Category::Clouds);
        assert_eq!(normalize("Clear"), Category::Clear);
        assert_eq!(normalize("Sunny"), Category::Clear);
    }

    #[test]
    fn unknown_falls_back_to_all() {
        assert_eq!(normalize("Mist"), Category::All);
        assert_eq!(normalize("Haze"), Category::All);
        assert_eq!(normalize(""), Category::All);
    }

    #[test]
    fn rain_beats_snow_and_clouds() {
        assert_eq!(normalize("Rain and Snow"), Category::Rain);
        assert_eq!(normalize("light rain, broken clouds"), Category::Rain);
        assert_eq!(normalize("Snow clouds"), Category::Snow);
    }

    #[test]
    fn casing_is_irrelevant() {
        assert_eq!(normalize("THUNDERSTORM"), Category::Rain);
        assert_eq!(normalize("cLeAr"), Category::Clear);
    }

    proptest! {
        #[test]
        fn thunderstorm_always_normalizes_to_rain(
            prefix in "[a-zA-Z ]{0,12}",
            suffix in "[a-zA-Z ]{0,12}",
        ) {
            let text = format!("{prefix}thunderstorm{suffix}");
            prop_assert_eq!(normalize(&text), Category::Rain);
        }

        #[test]
        fn normalize_is_total(text in ".{0,40}") {
            prop_assert!(Category::all().contains(&normalize(&text)));
        }
    }
}
