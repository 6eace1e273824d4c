//! Mock web search. Returns canned, query-shaped results.

use super::BuiltinSkill;
use crate::skills::SkillMetadata;
use crate::tools::names::WEB_SEARCH;
use crate::tools::{FnTool, Tool};
use crate::{ToolDef, json_schema_for};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

const MAX_RESULTS: u32 = 10;

/// Arguments for the `web_search` tool.
#[derive(Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// Search query.
    pub query: String,
    /// Maximum number of results (1-10). Defaults to 3.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    3
}

pub fn skill() -> BuiltinSkill {
    BuiltinSkill::new(
        SkillMetadata::new(
            "web_search",
            "Search the web for current information, news, and facts",
        )
        .with_version("1.0.0")
        .with_tags(["search", "web"]),
        vec![search_tool()],
    )
}

pub fn search_tool() -> Arc<dyn Tool> {
    let def = ToolDef::new(
        WEB_SEARCH,
        "Search the web and return a short list of results with titles, URLs, and snippets.",
        json_schema_for::<SearchArgs>(),
    );
    Arc::new(FnTool::new(def, |args: SearchArgs| async move {
        search(&args.query, args.max_results)
    }))
}

fn slug(query: &str) -> String {
    query
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn search(query: &str, max_results: u32) -> String {
    let query = query.trim();
    if query.is_empty() {
        return "Error: 'query' must not be empty.".into();
    }
    let count = max_results.clamp(1, MAX_RESULTS);
    let slug = slug(query);

    let mut out = format!("Search results for \"{query}\":");
    for i in 1..=count {
        out.push_str(&format!(
            "\n{i}. {query} (result {i})\n   https://example.com/{slug}/{i}\n   \
             Summary of source {i} about {query}."
        ));
    }
    out
}
