//! Skills that ship with the crate.
//!
//! | Skill | Tools |
//! |-------|-------|
//! | `calculator` | `calculate` |
//! | `weather` | `get_weather`, `get_forecast` (mock data) |
//! | `web_search` | `web_search` (mock results) |
//! | `datetime` | `current_time`, `date_diff` |
//!
//! Register all of them with [`builtin_skills()`].

pub mod calculator;
pub mod datetime;
pub mod search;
pub mod weather;

use super::{Skill, SkillMetadata};
use crate::tools::Tool;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

/// A skill assembled from metadata and a fixed tool list.
///
/// Its hooks only log and count, which is all the built-ins need.
pub struct BuiltinSkill {
    meta: SkillMetadata,
    tools: Vec<Arc<dyn Tool>>,
    inits: AtomicU32,
    cleanups: AtomicU32,
}

impl BuiltinSkill {
    pub fn new(meta: SkillMetadata, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            meta,
            tools,
            inits: AtomicU32::new(0),
            cleanups: AtomicU32::new(0),
        }
    }

    /// How many times `initialize` has run.
    pub fn init_count(&self) -> u32 {
        self.inits.load(Ordering::SeqCst)
    }

    /// How many times `cleanup` has run.
    pub fn cleanup_count(&self) -> u32 {
        self.cleanups.load(Ordering::SeqCst)
    }
}

impl Skill for BuiltinSkill {
    fn metadata(&self) -> &SkillMetadata {
        &self.meta
    }

    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    fn initialize(&self) -> Result<(), String> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        debug!("Built-in skill '{}' ready", self.meta.name);
        Ok(())
    }

    fn cleanup(&self) -> Result<(), String> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        debug!("Built-in skill '{}' released", self.meta.name);
        Ok(())
    }
}

/// Every built-in skill, ready for [`SkillRegistry::register_all`](super::SkillRegistry::register_all).
pub fn builtin_skills() -> Vec<Box<dyn Skill>> {
    vec![
        Box::new(calculator::skill()),
        Box::new(weather::skill()),
        Box::new(search::skill()),
        Box::new(datetime::skill()),
    ]
}
