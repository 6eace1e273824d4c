//! Clock and calendar helpers backed by `chrono`.

use super::BuiltinSkill;
use crate::skills::SkillMetadata;
use crate::tools::names::{CURRENT_TIME, DATE_DIFF};
use crate::tools::{FnTool, Tool};
use crate::{ToolDef, json_schema_for};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Arguments for the `current_time` tool.
#[derive(Deserialize, JsonSchema)]
pub struct CurrentTimeArgs {
    /// Offset from UTC in whole hours (-12 to 14). Defaults to 0.
    #[serde(default)]
    pub utc_offset_hours: i32,
}

/// Arguments for the `date_diff` tool.
#[derive(Deserialize, JsonSchema)]
pub struct DateDiffArgs {
    /// Start date, `YYYY-MM-DD`.
    pub from: String,
    /// End date, `YYYY-MM-DD`.
    pub to: String,
}

pub fn skill() -> BuiltinSkill {
    BuiltinSkill::new(
        SkillMetadata::new(
            "datetime",
            "Current date and time in any UTC offset, and day counts between dates",
        )
        .with_version("1.0.0")
        .with_tags(["time", "calendar"]),
        vec![current_time_tool(), date_diff_tool()],
    )
}

pub fn current_time_tool() -> Arc<dyn Tool> {
    let def = ToolDef::new(
        CURRENT_TIME,
        "Get the current date and time, optionally shifted to a UTC offset in hours.",
        json_schema_for::<CurrentTimeArgs>(),
    );
    Arc::new(FnTool::new(def, |args: CurrentTimeArgs| async move {
        match time_at_offset(Utc::now(), args.utc_offset_hours) {
            Ok(t) => format!("Current time: {}", t.format("%Y-%m-%d %H:%M:%S %:z (%A)")),
            Err(e) => format!("Error: {e}"),
        }
    }))
}

pub fn date_diff_tool() -> Arc<dyn Tool> {
    let def = ToolDef::new(
        DATE_DIFF,
        "Count the days between two dates given as YYYY-MM-DD.",
        json_schema_for::<DateDiffArgs>(),
    );
    Arc::new(FnTool::new(def, |args: DateDiffArgs| async move {
        match days_between(&args.from, &args.to) {
            Ok(days) => format!("{days} day(s) from {} to {}", args.from, args.to),
            Err(e) => format!("Error: {e}"),
        }
    }))
}

/// Shift a UTC instant into a whole-hour offset.
pub fn time_at_offset(now: DateTime<Utc>, hours: i32) -> Result<DateTime<FixedOffset>, String> {
    if !(-12..=14).contains(&hours) {
        return Err(format!("utc_offset_hours must be between -12 and 14, got {hours}"));
    }
    let offset = FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| format!("invalid UTC offset {hours}"))?;
    Ok(now.with_timezone(&offset))
}

/// Signed day count from `from` to `to`.
pub fn days_between(from: &str, to: &str) -> Result<i64, String> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
    };
    Ok((parse(to)? - parse(from)?).num_days())
}
