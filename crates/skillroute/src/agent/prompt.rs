//! System prompts for the router and the conversational agent.
//!
//! [`SystemPromptBuilder`] assembles multi-section prompts. [`router_prompt`]
//! renders the routing instructions around a metadata-only skill catalog,
//! and [`conversation_prompt`] appends the active-tools section the agent
//! sees after every executor rebuild.

use crate::skills::SkillMetadata;

/// Base system prompt for conversational turns.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the available tools \
when they help answer the user's request, and answer directly when they do not.";

const ROUTER_PREAMBLE: &str = "You are a skill router for an AI assistant. Given the user's \
message and the catalog of available skills, decide which skills the assistant needs to \
answer it. You never answer the message yourself.";

const ROUTER_RULES: &str = "\
- Return an empty skills list for greetings, small talk, and general conversation.
- Select only skills that are clearly relevant to the message.
- Prefer fewer skills over more.
- When uncertain, pick the single most likely skill.
- Use skill names exactly as they appear in the catalog.";

const ROUTER_FORMAT: &str = r#"Respond with a single JSON object and nothing else:

{"skills": ["skill_name"], "reasoning": "one short sentence"}"#;

/// Builder for multi-section system prompts.
///
/// Sections are joined with double newlines. Empty sections are skipped.
///
/// # Example
///
/// ```
/// use skillroute::agent::prompt::SystemPromptBuilder;
///
/// let prompt = SystemPromptBuilder::new("You are a helpful agent.")
///     .section("Context", "Today is Monday.")
///     .section_if(false, "Hidden", || "never rendered".into())
///     .section_opt("Missing", None::<String>)
///     .build();
///
/// assert!(prompt.contains("## Context"));
/// assert!(!prompt.contains("## Hidden"));
/// assert!(!prompt.contains("## Missing"));
/// ```
pub struct SystemPromptBuilder {
    sections: Vec<String>,
    heading_prefix: String,
}

impl SystemPromptBuilder {
    /// Create a new builder with an initial preamble section.
    ///
    /// The preamble is included as-is. Sections added with `section()` get
    /// `## ` headings by default.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            sections: vec![preamble.into()],
            heading_prefix: "##".to_string(),
        }
    }

    /// Set the heading level for subsequent `section()` calls.
    pub fn heading_level(mut self, level: u8) -> Self {
        self.heading_prefix = "#".repeat(level as usize);
        self
    }

    /// Append a named section with a markdown heading. Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections
                .push(format!("{} {heading}\n\n{content}", self.heading_prefix));
        }
        self
    }

    /// Conditionally append a section. `content_fn` only runs when `condition` holds.
    pub fn section_if(
        self,
        condition: bool,
        heading: &str,
        content_fn: impl FnOnce() -> String,
    ) -> Self {
        if condition {
            self.section(heading, content_fn())
        } else {
            self
        }
    }

    /// Append a section only if the content is `Some`.
    pub fn section_opt(self, heading: &str, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.section(heading, c),
            None => self,
        }
    }

    /// Append raw text without a heading. Skipped if empty.
    pub fn raw(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.sections.push(text);
        }
        self
    }

    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

/// One `- name: description` line per skill.
pub fn skill_catalog(skills: &[SkillMetadata]) -> String {
    skills
        .iter()
        .map(|m| format!("- {}", m.catalog_line()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The routing system prompt for a catalog.
pub fn router_prompt(catalog: &str) -> String {
    SystemPromptBuilder::new(ROUTER_PREAMBLE)
        .section("Available skills", catalog)
        .section("Rules", ROUTER_RULES)
        .section("Response format", ROUTER_FORMAT)
        .build()
}

/// The conversational system prompt for the current tool set.
pub fn conversation_prompt(base: &str, tool_names: &[String]) -> String {
    SystemPromptBuilder::new(base)
        .section_if(!tool_names.is_empty(), "Loaded tools", || {
            format!(
                "The following tools are loaded for this conversation: {}.",
                tool_names.join(", ")
            )
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_prompt_lists_catalog_and_rules() {
        let catalog = skill_catalog(&[
            SkillMetadata::new("weather", "Weather lookups"),
            SkillMetadata::new("calculator", "Arithmetic"),
        ]);
        assert_eq!(catalog, "- weather: Weather lookups\n- calculator: Arithmetic");

        let prompt = router_prompt(&catalog);
        assert!(prompt.starts_with("You are a skill router"));
        assert!(prompt.contains("## Available skills\n\n- weather: Weather lookups"));
        assert!(prompt.contains("empty skills list"));
        assert!(prompt.contains(r#""reasoning""#));
    }

    #[test]
    fn conversation_prompt_mentions_tools_only_when_present() {
        assert_eq!(conversation_prompt("Base.", &[]), "Base.");
        let prompt = conversation_prompt(
            "Base.",
            &["get_weather".to_string(), "get_forecast".to_string()],
        );
        assert!(prompt.contains("## Loaded tools"));
        assert!(prompt.contains("get_weather, get_forecast"));
    }

    #[test]
    fn builder_skips_empty_sections() {
        let prompt = SystemPromptBuilder::new("P")
            .section("Empty", "")
            .raw("")
            .heading_level(3)
            .section("Deep", "x")
            .build();
        assert_eq!(prompt, "P\n\n### Deep\n\nx");
    }
}
