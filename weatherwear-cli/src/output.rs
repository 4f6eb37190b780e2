use chrono::{DateTime, Local, Utc};
use weatherwear_core::{
    AlertRecord, ClothingItem, OutfitSelection, Place, Recommendation, Role, Severity,
    WeatherReport,
};

fn local(time: DateTime<Utc>, format: &str) -> String {
    time.with_timezone(&Local).format(format).to_string()
}

fn percent(probability: f64) -> i64 {
    (probability * 100.0).round() as i64
}

pub fn print_conditions(place: &Place, report: &WeatherReport) {
    let now = &report.current;
    let deg = report.units.temperature_symbol();

    println!("{} ({})", place.name, place.coordinates);
    println!(
        "{:.0}{deg}, feels like {:.0}{deg} · {} · humidity {}% · wind {:.0} {} · UV {:.0} · precipitation {}%",
        now.temperature,
        now.temperature_feels_like,
        if now.description.is_empty() { &now.condition_text } else { &now.description },
        now.humidity_pct,
        now.wind_speed,
        report.units.wind_unit(),
        now.uv_index,
        percent(now.precipitation_probability),
    );
}

pub fn print_weather(place: &Place, report: &WeatherReport) {
    print_conditions(place, report);
    let deg = report.units.temperature_symbol();

    if let (Some(sunrise), Some(sunset)) = (report.sunrise, report.sunset) {
        println!("Sunrise {} · Sunset {}", local(sunrise, "%H:%M"), local(sunset, "%H:%M"));
    }

    if !report.hourly.is_empty() {
        println!();
        println!("Next hours:");
        for hour in report.hourly.iter().take(12) {
            println!(
                "  {}  {:>4.0}{deg}  {:<12} {:>3}%",
                local(hour.time, "%H:%M"),
                hour.temperature,
                hour.condition_text,
                percent(hour.precipitation_probability),
            );
        }
    }

    if !report.daily.is_empty() {
        println!();
        println!("Week:");
        for day in &report.daily {
            println!(
                "  {}  {:>4.0}{deg} / {:<4.0}{deg} {:<12} {:>3}%",
                local(day.date, "%a"),
                day.temp_max,
                day.temp_min,
                day.condition_text,
                percent(day.precipitation_probability),
            );
        }
    }
}

pub fn print_alerts(alerts: &[AlertRecord]) {
    if alerts.is_empty() {
        return;
    }

    println!();
    println!("⚠️  Weather alerts:");
    for alert in alerts {
        let level = match alert.severity {
            Severity::Danger => "DANGER",
            Severity::Warning => "warning",
        };
        println!("  {} [{level}] {}", alert.symbol, alert.message);
    }
}

fn describe(item: &ClothingItem) -> String {
    let mut line = format!("{} (#{})", item.garment_type, item.id);
    if let Some(color) = &item.color {
        line.push_str(&format!(" in {color}"));
    }
    line
}

pub fn print_selection(selection: Option<&OutfitSelection>) {
    let Some(selection) = selection else {
        println!("  No outfit yet.");
        return;
    };

    for (role, item) in selection.slots() {
        let label = if role == Role::Accessory { "Accessories" } else { role.label() };
        match item {
            Some(item) => println!("  {label:<12} {}", describe(item)),
            None => println!("  {label:<12} No match"),
        }
    }
}

pub fn print_outfit(recommendation: &Recommendation, shown: Option<&OutfitSelection>) {
    println!();
    println!(
        "Today's outfit ({:.0}°, {}; {} candidate items):",
        recommendation.target_temperature,
        recommendation.category,
        recommendation.candidates.len(),
    );
    print_selection(shown);
}

pub fn print_wardrobe(items: &[ClothingItem]) {
    if items.is_empty() {
        println!("Your wardrobe is empty. Add something with `weatherwear wardrobe add`.");
        return;
    }

    for role in [Role::Top, Role::Bottom, Role::Accessory] {
        let group: Vec<&ClothingItem> = items.iter().filter(|i| i.role == role).collect();
        if group.is_empty() {
            continue;
        }

        println!("{}:", role.label());
        for item in group {
            println!(
                "  {} #{:<5} {:<16} {:>5.0}..{:<5.0} {:<7}{}",
                if item.favorited { "★" } else { " " },
                item.id,
                item.garment_type,
                item.temp_low,
                item.temp_high,
                item.condition_tag,
                item.color.as_deref().map(|c| format!(" {c}")).unwrap_or_default(),
            );
        }
    }
}
