//! Mock weather lookups.
//!
//! Readings are derived from the location name, so the same city always
//! reports the same weather. Good enough to exercise routing and tool calls.

use super::BuiltinSkill;
use crate::skills::SkillMetadata;
use crate::tools::names::{GET_FORECAST, GET_WEATHER};
use crate::tools::{FnTool, Tool};
use crate::{ToolDef, json_schema_for};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

const CONDITIONS: [&str; 6] = [
    "sunny",
    "partly cloudy",
    "overcast",
    "light rain",
    "thunderstorms",
    "snow",
];

const MAX_FORECAST_DAYS: u32 = 7;

#[derive(Deserialize, JsonSchema, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Arguments for the `get_weather` tool.
#[derive(Deserialize, JsonSchema)]
pub struct WeatherArgs {
    /// City or place name.
    pub location: String,
    /// Temperature unit. Defaults to celsius.
    #[serde(default)]
    pub unit: TemperatureUnit,
}

/// Arguments for the `get_forecast` tool.
#[derive(Deserialize, JsonSchema)]
pub struct ForecastArgs {
    /// City or place name.
    pub location: String,
    /// Number of days to forecast (1-7). Defaults to 3.
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    3
}

pub fn skill() -> BuiltinSkill {
    BuiltinSkill::new(
        SkillMetadata::new(
            "weather",
            "Current weather conditions and multi-day forecasts for a location",
        )
        .with_version("1.0.0")
        .with_tags(["weather", "forecast"]),
        vec![weather_tool(), forecast_tool()],
    )
}

pub fn weather_tool() -> Arc<dyn Tool> {
    let def = ToolDef::new(
        GET_WEATHER,
        "Get the current weather for a location.",
        json_schema_for::<WeatherArgs>(),
    );
    Arc::new(FnTool::new(def, |args: WeatherArgs| async move {
        current_conditions(&args.location, args.unit)
    }))
}

pub fn forecast_tool() -> Arc<dyn Tool> {
    let def = ToolDef::new(
        GET_FORECAST,
        "Get a daily weather forecast for a location, up to 7 days ahead.",
        json_schema_for::<ForecastArgs>(),
    );
    Arc::new(FnTool::new(def, |args: ForecastArgs| async move {
        forecast(&args.location, args.days)
    }))
}

fn seed(location: &str, day: u32) -> u32 {
    location
        .trim()
        .to_lowercase()
        .bytes()
        .fold(day.wrapping_mul(31), |acc, b| {
            acc.wrapping_mul(33).wrapping_add(u32::from(b))
        })
}

fn reading(location: &str, day: u32) -> (i32, &'static str) {
    let s = seed(location, day);
    let celsius = (s % 36) as i32 - 5;
    let condition = CONDITIONS[(s / 36) as usize % CONDITIONS.len()];
    (celsius, condition)
}

fn format_temp(celsius: i32, unit: TemperatureUnit) -> String {
    match unit {
        TemperatureUnit::Celsius => format!("{celsius}°C"),
        TemperatureUnit::Fahrenheit => {
            format!("{}°F", (f64::from(celsius) * 9.0 / 5.0 + 32.0).round() as i64)
        }
    }
}

pub fn current_conditions(location: &str, unit: TemperatureUnit) -> String {
    if location.trim().is_empty() {
        return "Error: 'location' must not be empty.".into();
    }
    let (celsius, condition) = reading(location, 0);
    format!(
        "Weather in {}: {}, {}",
        location.trim(),
        condition,
        format_temp(celsius, unit)
    )
}

pub fn forecast(location: &str, days: u32) -> String {
    if location.trim().is_empty() {
        return "Error: 'location' must not be empty.".into();
    }
    if days == 0 || days > MAX_FORECAST_DAYS {
        return format!("Error: 'days' must be between 1 and {MAX_FORECAST_DAYS}.");
    }
    let mut out = format!("{}-day forecast for {}:", days, location.trim());
    for day in 1..=days {
        let (celsius, condition) = reading(location, day);
        out.push_str(&format!(
            "\n  day {day}: {condition}, {}",
            format_temp(celsius, TemperatureUnit::Celsius)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_are_deterministic_and_case_insensitive() {
        assert_eq!(
            current_conditions("Paris", TemperatureUnit::Celsius),
            current_conditions("Paris", TemperatureUnit::Celsius)
        );
        assert_eq!(reading("Paris", 0), reading("  paris ", 0));
    }

    #[test]
    fn temperature_stays_in_plausible_range() {
        for city in ["Paris", "Oslo", "Lagos", "Lima", "Tokyo"] {
            let (c, _) = reading(city, 0);
            assert!((-5..=30).contains(&c), "{city}: {c}");
        }
    }

    #[test]
    fn forecast_validates_days() {
        assert!(forecast("Paris", 0).starts_with("Error"));
        assert!(forecast("Paris", 8).starts_with("Error"));
        let out = forecast("Paris", 2);
        assert!(out.starts_with("2-day forecast for Paris:"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn fahrenheit_is_rounded_to_nearest_degree() {
        assert_eq!(format_temp(1, TemperatureUnit::Fahrenheit), "34°F");
        assert_eq!(format_temp(21, TemperatureUnit::Fahrenheit), "70°F");
        assert_eq!(format_temp(-5, TemperatureUnit::Fahrenheit), "23°F");
        assert_eq!(format_temp(-3, TemperatureUnit::Fahrenheit), "27°F");
        assert_eq!(format_temp(21, TemperatureUnit::Celsius), "21°C");
    }

    #[tokio::test]
    async fn tool_accepts_unit() {
        let out = weather_tool()
            .execute(r#"{"location": "Paris", "unit": "fahrenheit"}"#)
            .await;
        assert!(out.starts_with("Weather in Paris:"));
        assert!(out.ends_with("°F"));
    }
}
