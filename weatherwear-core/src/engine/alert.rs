use crate::model::{AlertRecord, Severity, UnitSystem, WeatherSnapshot};

pub const HIGH_UV_INDEX: f64 = 8.0;
pub const HIGH_PRECIPITATION_PROBABILITY: f64 = 0.7;
pub const LOW_VISIBILITY_METERS: f64 = 1000.0;

/// Thresholds that depend on the unit system of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub extreme_heat: f64,
    pub extreme_cold: f64,
    pub strong_wind: f64,
}

impl Thresholds {
    pub fn for_units(units: UnitSystem) -> Self {
        match units {
            UnitSystem::Metric => Self {
                extreme_heat: 35.0,
                extreme_cold: 0.0,
                strong_wind: 11.0,
            },
            UnitSystem::Imperial => Self {
                extreme_heat: 95.0,
                extreme_cold: 32.0,
                strong_wind: 25.0,
            },
        }
    }
}

/// Evaluate every rule against `weather`, in fixed order.
///
/// Rules are independent; an empty result means nothing extreme is going on.
pub fn detect(weather: &WeatherSnapshot, units: UnitSystem) -> Vec<AlertRecord> {
    let limits = Thresholds::for_units(units);
    let condition = weather.condition_text.to_ascii_lowercase();
    let feels_like = weather.temperature_feels_like;
    let wind = weather.wind_speed;
    let strong_wind = wind >= limits.strong_wind;

    let mut alerts = Vec::new();

    if feels_like >= limits.extreme_heat {
        alerts.push(alert(
            Severity::Danger,
            "🥵",
            format!(
                "Extreme heat alert! Feels like {}{}. Wear light, breathable clothing and stay hydrated.",
                whole(feels_like),
                units.temperature_symbol()
            ),
        ));
    }

    if feels_like <= limits.extreme_cold {
        alerts.push(alert(
            Severity::Danger,
            "🥶",
            format!(
                "Freezing temperature alert! Feels like {}{}. Bundle up with warm layers.",
                whole(feels_like),
                units.temperature_symbol()
            ),
        ));
    }

    if weather.uv_index >= HIGH_UV_INDEX {
        alerts.push(alert(
            Severity::Warning,
            "☀️",
            format!(
                "Very high UV index ({}). Wear sunscreen, sunglasses, and protective clothing.",
                whole(weather.uv_index)
            ),
        ));
    }

    if weather.precipitation_probability >= HIGH_PRECIPITATION_PROBABILITY {
        alerts.push(alert(
            Severity::Warning,
            "🌧️",
            format!(
                "High chance of rain ({}%). Don't forget an umbrella or rain jacket!",
                whole(weather.precipitation_probability * 100.0)
            ),
        ));
    }

    if strong_wind {
        alerts.push(alert(
            Severity::Warning,
            "💨",
            format!(
                "Strong winds ({} {}). Secure loose items and dress accordingly.",
                whole(wind),
                units.wind_unit()
            ),
        ));
    }

    if weather.visibility_meters < LOW_VISIBILITY_METERS {
        alerts.push(alert(
            Severity::Warning,
            "🌫️",
            format!(
                "Low visibility ({}m). Be careful if traveling.",
                weather.visibility_meters.floor() as i64
            ),
        ));
    }

    if condition.contains("thunderstorm") {
        alerts.push(alert(
            Severity::Danger,
            "⛈️",
            "Thunderstorm warning! Avoid outdoor activities if possible.".to_string(),
        ));
    }

    if condition.contains("snow") && strong_wind {
        alerts.push(alert(
            Severity::Danger,
            "🌨️",
            format!(
                "Blizzard conditions! Heavy snow with {} {} winds. Stay warm and safe.",
                whole(wind),
                units.wind_unit()
            ),
        ));
    }

    alerts
}

fn alert(severity: Severity, symbol: &str, message: String) -> AlertRecord {
    AlertRecord {
        severity,
        symbol: symbol.to_string(),
        message,
    }
}

// Integer display avoids "-0" for readings like -0.3.
fn whole(value: f64) -> i64 {
    value.round() as i64
}
