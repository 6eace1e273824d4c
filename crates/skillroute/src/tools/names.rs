//! Canonical tool name constants for the built-in skills.
//!
//! Tool names must be unique across every skill that can be loaded into one
//! session, not only within their own skill.

pub const CALCULATE: &str = "calculate";
pub const GET_WEATHER: &str = "get_weather";
pub const GET_FORECAST: &str = "get_forecast";
pub const WEB_SEARCH: &str = "web_search";
pub const CURRENT_TIME: &str = "current_time";
pub const DATE_DIFF: &str = "date_diff";
