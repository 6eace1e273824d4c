//! Skills: named bundles of tools with lightweight metadata.
//!
//! A [`Skill`] is anything that can describe itself with [`SkillMetadata`],
//! hand out its tools, and optionally run `initialize` / `cleanup` hooks.
//! The [`SkillRegistry`] tracks which skills are registered, which have been
//! initialized, and which have been loaded into the current session.
//!
//! Only the metadata is ever shown to the router. Tool schemas stay hidden
//! until a skill is loaded; that is what keeps the routing prompt small.

pub mod builtin;
pub mod registry;

pub use registry::SkillRegistry;

use crate::tools::Tool;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Router-facing description of a skill. Never carries tool schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillMetadata {
    /// Unique skill id.
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl SkillMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// One catalog line: `name: description`.
    pub fn catalog_line(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }
}

/// The `{name, description}` pair a front-end shows for a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    pub name: String,
    pub description: String,
}

impl From<&SkillMetadata> for SkillSummary {
    fn from(meta: &SkillMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            description: meta.description.clone(),
        }
    }
}

/// A self-contained capability unit.
///
/// Hooks default to no-ops. Hook errors are plain strings; the registry
/// wraps them into [`Error::SkillHook`](crate::Error::SkillHook).
///
/// # Example
///
/// ```ignore
/// struct Translate { meta: SkillMetadata, tools: Vec<Arc<dyn Tool>> }
///
/// impl Skill for Translate {
///     fn metadata(&self) -> &SkillMetadata { &self.meta }
///     fn tools(&self) -> Vec<Arc<dyn Tool>> { self.tools.clone() }
/// }
/// ```
pub trait Skill: Send + Sync {
    fn metadata(&self) -> &SkillMetadata;

    /// The skill's full tool sequence, in the order it should be offered.
    fn tools(&self) -> Vec<Arc<dyn Tool>>;

    /// One-time setup (open a connection, warm a cache). Runs at most once
    /// per registered skill.
    fn initialize(&self) -> Result<(), String> {
        Ok(())
    }

    /// Teardown for an initialized skill. Runs on session shutdown.
    fn cleanup(&self) -> Result<(), String> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.metadata().name
    }
}
