//! The skill catalog and its three lifecycle sets.
//!
//! - **registered** — name → skill. Re-registering a name overwrites it and
//!   logs a warning.
//! - **initialized** — skills whose `initialize` hook has run. Only grows;
//!   each hook runs at most once per name for the registry's lifetime.
//! - **loaded** — skills whose tools were handed out this session. Cleared by
//!   [`SkillRegistry::reset_loaded_skills`].
//!
//! Both `initialized` and `loaded` are always subsets of `registered`.

use super::{Skill, SkillMetadata, SkillSummary};
use crate::error::{Error, Result};
use crate::tools::Tool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
pub struct SkillRegistry {
    skills: HashMap<String, Box<dyn Skill>>,
    initialized: HashSet<String>,
    cleaned_up: HashSet<String>,
    loaded: HashSet<String>,
}

impl std::fmt::Debug for SkillRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillRegistry")
            .field("registered", &self.sorted_names())
            .field("initialized", &self.initialized)
            .field("cleaned_up", &self.cleaned_up)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill (builder pattern).
    pub fn with(mut self, skill: impl Skill + 'static) -> Self {
        self.register(Box::new(skill));
        self
    }

    /// Insert a skill under its metadata name.
    ///
    /// An existing skill with the same name is replaced and a warning is
    /// logged. Initialization is tracked per name, so an initialized name
    /// stays initialized and the replacement's `initialize` hook never runs.
    pub fn register(&mut self, skill: Box<dyn Skill>) {
        let name = skill.name().to_string();
        if self.skills.contains_key(&name) {
            warn!("Skill '{name}' is already registered; overwriting");
        } else {
            info!(
                "Registered skill '{name}' ({} tool(s))",
                skill.tools().len()
            );
        }
        self.skills.insert(name, skill);
    }

    /// Register each skill in order. Not atomic: earlier registrations stay
    /// in place whatever happens to later ones.
    pub fn register_all(&mut self, skills: impl IntoIterator<Item = Box<dyn Skill>>) {
        for skill in skills {
            self.register(skill);
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Skill> {
        self.skills.get(name).map(|s| s.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Metadata for every registered skill, sorted by name. Carries no tool
    /// schemas.
    pub fn get_all_metadata(&self) -> Vec<SkillMetadata> {
        let mut metas: Vec<SkillMetadata> =
            self.skills.values().map(|s| s.metadata().clone()).collect();
        metas.sort_by(|a, b| a.name.cmp(&b.name));
        metas
    }

    /// `{name, description}` for every registered skill, sorted by name.
    pub fn summaries(&self) -> Vec<SkillSummary> {
        self.get_all_metadata()
            .iter()
            .map(SkillSummary::from)
            .collect()
    }

    /// Hand out a skill's tools for this session.
    ///
    /// Returns `None` when the name is unknown or the skill was already
    /// loaded this session; a repeated call is a no-op.
    pub fn load_skill(&mut self, name: &str) -> Option<Vec<Arc<dyn Tool>>> {
        let Some(skill) = self.skills.get(name) else {
            debug!("load_skill: '{name}' is not registered");
            return None;
        };
        if self.loaded.contains(name) {
            debug!("load_skill: '{name}' already loaded this session");
            return None;
        }

        let tools = skill.tools();
        self.loaded.insert(name.to_string());
        info!("Loaded skill '{name}' ({} tool(s))", tools.len());
        Some(tools)
    }

    pub fn is_skill_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Names loaded this session, sorted.
    pub fn get_loaded_skill_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaded.iter().cloned().collect();
        names.sort();
        names
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.initialized.contains(name)
    }

    /// Run a skill's `initialize` hook if it has not run yet.
    ///
    /// A failing hook leaves the skill uninitialized, so a later call retries.
    pub fn initialize_skill(&mut self, name: &str) -> Result<()> {
        let skill = self
            .skills
            .get(name)
            .ok_or_else(|| Error::UnknownSkill(name.to_string()))?;
        if self.initialized.contains(name) {
            return Ok(());
        }

        skill.initialize().map_err(|reason| Error::SkillHook {
            skill: name.to_string(),
            hook: "initialize",
            reason,
        })?;
        self.initialized.insert(name.to_string());
        info!("Initialized skill '{name}'");
        Ok(())
    }

    /// Initialize every registered skill, in name order. Stops at the first
    /// failing hook.
    pub fn initialize_all(&mut self) -> Result<()> {
        for name in self.sorted_names() {
            self.initialize_skill(&name)?;
        }
        Ok(())
    }

    /// Forget which skills were loaded this session.
    ///
    /// Leaves the initialized set alone and runs no `cleanup` hooks:
    /// initialization is a per-process cost, loading is per session.
    pub fn reset_loaded_skills(&mut self) {
        if !self.loaded.is_empty() {
            debug!("Resetting {} loaded skill(s)", self.loaded.len());
        }
        self.loaded.clear();
    }

    /// Run `cleanup` for every initialized skill not cleaned up yet, in name
    /// order.
    ///
    /// The initialized set is left as is, so a later `initialize_skill` stays
    /// a no-op. Every hook runs even if an earlier one fails; the first
    /// failure is returned. A failed hook still counts as run.
    pub fn cleanup_all(&mut self) -> Result<()> {
        let mut names: Vec<String> = self
            .initialized
            .difference(&self.cleaned_up)
            .cloned()
            .collect();
        names.sort();

        let mut first_error = None;
        for name in names {
            let Some(skill) = self.skills.get(&name) else {
                continue;
            };
            self.cleaned_up.insert(name.clone());
            match skill.cleanup() {
                Ok(()) => debug!("Cleaned up skill '{name}'"),
                Err(reason) => {
                    warn!("Cleanup of skill '{name}' failed: {reason}");
                    first_error.get_or_insert(Error::SkillHook {
                        skill: name,
                        hook: "cleanup",
                        reason,
                    });
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.skills.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolDef;
    use crate::tools::ToolFuture;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct NamedTool(&'static str);

    impl Tool for NamedTool {
        fn definition(&self) -> ToolDef {
            ToolDef::new(
                self.0,
                "test tool",
                serde_json::json!({"type": "object", "properties": {"q": {"type": "string"}}}),
            )
        }

        fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
            Box::pin(async { "ok".to_string() })
        }
    }

    #[derive(Default)]
    struct Counters {
        inits: AtomicU32,
        cleanups: AtomicU32,
    }

    struct TestSkill {
        meta: SkillMetadata,
        tool_names: Vec<&'static str>,
        counters: Arc<Counters>,
        fail_init: bool,
    }

    impl TestSkill {
        fn new(name: &str, tool_names: &[&'static str]) -> Self {
            Self {
                meta: SkillMetadata::new(name, format!("{name} skill")),
                tool_names: tool_names.to_vec(),
                counters: Arc::new(Counters::default()),
                fail_init: false,
            }
        }
    }

    impl Skill for TestSkill {
        fn metadata(&self) -> &SkillMetadata {
            &self.meta
        }

        fn tools(&self) -> Vec<Arc<dyn Tool>> {
            self.tool_names
                .iter()
                .map(|n| Arc::new(NamedTool(n)) as Arc<dyn Tool>)
                .collect()
        }

        fn initialize(&self) -> std::result::Result<(), String> {
            if self.fail_init {
                return Err("backend unavailable".into());
            }
            self.counters.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn cleanup(&self) -> std::result::Result<(), String> {
            self.counters.cleanups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn registry() -> SkillRegistry {
        SkillRegistry::new()
            .with(TestSkill::new("weather", &["get_weather", "get_forecast"]))
            .with(TestSkill::new("calculator", &["calculate"]))
    }

    #[test]
    fn metadata_lists_every_registered_skill_without_schemas() {
        let reg = registry();
        let metas = reg.get_all_metadata();
        let names: Vec<&str> = metas.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["calculator", "weather"]);

        let json = serde_json::to_string(&metas).unwrap();
        assert!(!json.contains("parameters"));
        assert!(!json.contains("get_weather"));
    }

    #[test]
    fn load_skill_hands_out_tools_once() {
        let mut reg = registry();
        let tools = reg.load_skill("weather").expect("first load");
        let names: Vec<String> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["get_weather", "get_forecast"]);

        assert!(reg.load_skill("weather").is_none());
        assert_eq!(reg.get_loaded_skill_names(), vec!["weather"]);
        assert!(reg.is_skill_loaded("weather"));
    }

    #[test]
    fn load_unknown_skill_is_none() {
        let mut reg = registry();
        assert!(reg.load_skill("translator").is_none());
        assert!(reg.get_loaded_skill_names().is_empty());
    }

    #[test]
    fn initialize_runs_hook_exactly_once() {
        let skill = TestSkill::new("weather", &["get_weather"]);
        let counters = Arc::clone(&skill.counters);
        let mut reg = SkillRegistry::new().with(skill);

        reg.initialize_skill("weather").unwrap();
        reg.initialize_skill("weather").unwrap();
        reg.initialize_all().unwrap();

        assert_eq!(counters.inits.load(Ordering::SeqCst), 1);
        assert!(reg.is_initialized("weather"));
    }

    #[test]
    fn initialize_unknown_skill_fails() {
        let mut reg = registry();
        let err = reg.initialize_skill("translator").unwrap_err();
        assert!(matches!(err, Error::UnknownSkill(ref n) if n == "translator"));
    }

    #[test]
    fn failing_init_hook_is_reported_and_retryable() {
        let mut skill = TestSkill::new("db", &["query"]);
        skill.fail_init = true;
        let mut reg = SkillRegistry::new().with(skill);

        let err = reg.initialize_all().unwrap_err();
        assert!(matches!(err, Error::SkillHook { hook: "initialize", .. }));
        assert!(!reg.is_initialized("db"));
    }

    #[test]
    fn reset_clears_loaded_but_not_initialized() {
        let skill = TestSkill::new("weather", &["get_weather"]);
        let counters = Arc::clone(&skill.counters);
        let mut reg = SkillRegistry::new().with(skill);
        reg.initialize_all().unwrap();
        reg.load_skill("weather").unwrap();

        reg.reset_loaded_skills();

        assert!(reg.get_loaded_skill_names().is_empty());
        assert!(reg.is_initialized("weather"));
        assert_eq!(counters.cleanups.load(Ordering::SeqCst), 0);
        assert!(reg.load_skill("weather").is_some());
    }

    #[test]
    fn overwrite_replaces_skill_and_keeps_initialized_flag() {
        let first = TestSkill::new("weather", &["get_weather"]);
        let counters = Arc::clone(&first.counters);
        let mut reg = SkillRegistry::new().with(first);
        reg.initialize_all().unwrap();

        let mut second = TestSkill::new("weather", &["get_weather_v2"]);
        second.counters = Arc::clone(&counters);
        reg.register(Box::new(second));
        reg.initialize_all().unwrap();

        assert_eq!(reg.len(), 1);
        assert!(reg.is_initialized("weather"));
        assert_eq!(counters.inits.load(Ordering::SeqCst), 1);
        let tools = reg.load_skill("weather").unwrap();
        assert_eq!(tools[0].name(), "get_weather_v2");
    }

    #[test]
    fn init_hook_runs_once_across_cleanup_and_reinitialize() {
        let skill = TestSkill::new("weather", &["get_weather"]);
        let counters = Arc::clone(&skill.counters);
        let mut reg = SkillRegistry::new().with(skill);

        reg.initialize_skill("weather").unwrap();
        reg.cleanup_all().unwrap();
        reg.initialize_skill("weather").unwrap();
        reg.initialize_all().unwrap();

        assert_eq!(counters.inits.load(Ordering::SeqCst), 1);
        assert!(reg.is_initialized("weather"));
    }

    #[test]
    fn cleanup_all_runs_only_for_initialized_skills() {
        let a = TestSkill::new("a", &["a_tool"]);
        let b = TestSkill::new("b", &["b_tool"]);
        let (ca, cb) = (Arc::clone(&a.counters), Arc::clone(&b.counters));
        let mut reg = SkillRegistry::new().with(a).with(b);
        reg.initialize_skill("a").unwrap();

        reg.cleanup_all().unwrap();
        reg.cleanup_all().unwrap();

        assert_eq!(ca.cleanups.load(Ordering::SeqCst), 1);
        assert_eq!(cb.cleanups.load(Ordering::SeqCst), 0);
        assert!(reg.is_initialized("a"));
        assert!(!reg.is_initialized("b"));
    }

    #[test]
    fn register_all_preserves_order_and_last_wins() {
        let mut reg = SkillRegistry::new();
        reg.register_all(vec![
            Box::new(TestSkill::new("x", &["one"])) as Box<dyn Skill>,
            Box::new(TestSkill::new("x", &["two"])),
        ]);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.load_skill("x").unwrap()[0].name(), "two");
    }
}
