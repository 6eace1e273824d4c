//! The per-session orchestrator.
//!
//! Every turn runs two phases:
//!
//! 1. **Route.** The [`SkillRouter`] picks skills from the metadata catalog.
//! 2. **Execute.** Skills not yet loaded this session hand their tools to the
//!    [`ConversationalAgent`], which rebuilds its executor only when
//!    something new arrived, then answers the turn.
//!
//! Tools accumulate for the whole session. [`Orchestrator::clear_history`]
//! resets history, tools, and loaded skills in one step.

use super::config::AgentConfig;
use super::conversation::ConversationalAgent;
use super::events::{EventHandler, NoopHandler, SessionEvent};
use super::router::{RouterResult, SkillRouter};
use crate::error::{Error, Result};
use crate::model::ChatModel;
use crate::skills::builtin::builtin_skills;
use crate::skills::{SkillRegistry, SkillSummary};
use crate::tools::Tool;
use std::sync::Arc;
use tracing::{debug, info};

struct Session {
    router: SkillRouter,
    agent: ConversationalAgent,
}

/// Composes the router and the conversational agent over one registry.
///
/// `run` takes `&mut self`, so one session processes one turn at a time.
pub struct Orchestrator {
    model: Arc<dyn ChatModel>,
    config: AgentConfig,
    registry: SkillRegistry,
    handler: Arc<dyn EventHandler>,
    session: Option<Session>,
    loaded_tools: Vec<Arc<dyn Tool>>,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ChatModel>, config: AgentConfig, registry: SkillRegistry) -> Self {
        Self {
            model,
            config,
            registry,
            handler: Arc::new(NoopHandler),
            session: None,
            loaded_tools: Vec::new(),
        }
    }

    /// An orchestrator over the built-in skill set.
    pub fn with_builtin_skills(model: Arc<dyn ChatModel>, config: AgentConfig) -> Self {
        let mut registry = SkillRegistry::new();
        registry.register_all(builtin_skills());
        Self::new(model, config, registry)
    }

    /// Set the event handler for routing, loading, and agent events.
    ///
    /// Applies immediately, including to the agent of a running session.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        if let Some(session) = self.session.as_mut() {
            session.agent.set_event_handler(handler.clone());
        }
        self.handler = handler;
        self
    }

    /// Initialize every skill and build the router and agent.
    ///
    /// Calling it again starts a fresh session: history, accumulated tools,
    /// and loaded skills are all reset.
    pub fn initialize(&mut self) -> Result<()> {
        self.registry.initialize_all()?;
        if self.registry.is_empty() {
            return Err(Error::Configuration(
                "no skills registered; the router has nothing to choose from".into(),
            ));
        }

        let metadata = self.registry.get_all_metadata();
        let router = SkillRouter::new(self.model.clone(), &self.config, &metadata);
        let mut agent =
            ConversationalAgent::new(self.model.clone(), self.config.clone(), self.handler.clone());
        agent.initialize();

        self.registry.reset_loaded_skills();
        self.loaded_tools.clear();
        self.session = Some(Session { router, agent });
        info!("Session ready with {} skill(s)", metadata.len());
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Route the turn, load any new skills, and answer it.
    pub async fn run(&mut self, user_text: &str) -> Result<String> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::not_initialized("orchestrator"))?;

        let routed = session.router.run(user_text).await;
        self.handler.on_event(&SessionEvent::Routed {
            skills: &routed.skills,
            reasoning: &routed.reasoning,
        });

        let rebuild = handle_tools_loading(
            &mut self.registry,
            &mut self.loaded_tools,
            &routed,
            self.handler.as_ref(),
        );
        if rebuild {
            session.agent.build_executor(&self.loaded_tools);
        } else {
            debug!("No new skills this turn; reusing the current executor");
        }

        session.agent.run(user_text).await
    }

    /// Names of skills loaded this session, sorted.
    pub fn get_loaded_skills(&self) -> Vec<String> {
        self.registry.get_loaded_skill_names()
    }

    /// Name and description of every registered skill, sorted by name.
    pub fn get_available_skills(&self) -> Vec<SkillSummary> {
        self.registry.summaries()
    }

    /// Reset history, the agent's tools, and the loaded-skill set.
    pub fn clear_history(&mut self) -> Result<()> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::not_initialized("orchestrator"))?;

        session.agent.clear_history();
        session.agent.reset_tools();
        self.loaded_tools.clear();
        self.registry.reset_loaded_skills();
        session.agent.build_executor(&[]);

        self.handler.on_event(&SessionEvent::HistoryCleared);
        Ok(())
    }

    /// End the session and run every initialized skill's cleanup hook.
    ///
    /// Returns the first cleanup failure. The session is closed either way;
    /// call `initialize` to start a new one.
    pub fn shutdown(&mut self) -> Result<()> {
        self.session = None;
        self.loaded_tools.clear();
        self.registry.reset_loaded_skills();
        self.registry.cleanup_all()
    }

    /// Messages in the conversation history. Zero before `initialize`.
    pub fn history_len(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.agent.history().len())
    }

    /// Tool names the agent currently holds, in insertion order.
    pub fn active_tool_names(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| s.agent.tool_names())
            .unwrap_or_default()
    }

    /// Executor builds so far this session. Zero before `initialize`.
    pub fn executor_generation(&self) -> u64 {
        self.session
            .as_ref()
            .map_or(0, |s| s.agent.executor_generation())
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }
}

/// Load every routed skill not yet loaded, appending its tools to
/// `accumulated`. Unknown and already-loaded names contribute nothing.
/// Returns whether any skill was newly loaded.
fn handle_tools_loading(
    registry: &mut SkillRegistry,
    accumulated: &mut Vec<Arc<dyn Tool>>,
    routed: &RouterResult,
    handler: &dyn EventHandler,
) -> bool {
    let mut rebuild = false;
    for name in &routed.skills {
        let Some(tools) = registry.load_skill(name) else {
            continue;
        };
        let tool_names: Vec<String> = tools.iter().map(|t| t.name()).collect();
        handler.on_event(&SessionEvent::SkillLoaded {
            name: name.as_str(),
            tools: &tool_names,
        });
        accumulated.extend(tools);
        rebuild = true;
    }
    rebuild
}
