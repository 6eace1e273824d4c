//! Error type shared by the registry, agents, and orchestrator.
//!
//! Routing failures never appear here: the router absorbs them and degrades
//! to "no new skills" (see [`RoutingError`](crate::agent::router::RoutingError)).

use thiserror::Error;

/// Result type alias for skillroute.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An operation that needs `initialize()` ran before it.
    #[error("{component} is not initialized; call initialize() first")]
    NotInitialized { component: &'static str },

    /// A skill name that was never registered.
    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    /// Session setup is unusable, e.g. no skills are registered.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A skill's `initialize` or `cleanup` hook failed.
    #[error("skill '{skill}' {hook} hook failed: {reason}")]
    SkillHook {
        skill: String,
        hook: &'static str,
        reason: String,
    },

    /// The language model failed during the conversational turn.
    #[error("model invocation failed: {0}")]
    Invocation(String),
}

impl Error {
    pub(crate) fn not_initialized(component: &'static str) -> Self {
        Self::NotInitialized { component }
    }
}
