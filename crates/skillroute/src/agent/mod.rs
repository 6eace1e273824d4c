//! Agent runtime: the [`Orchestrator`] and the two agents it composes.
//!
//! - [`orchestrator::Orchestrator`] runs the per-turn route-then-execute
//!   protocol. Start here.
//! - [`router::SkillRouter`] makes the stateless routing call.
//! - [`conversation::ConversationalAgent`] holds history and the accumulated
//!   tool set and runs the tool-use loop.
//! - [`config::AgentConfig`] configures models, rounds, tokens, and retries.
//! - [`events`] has the [`EventHandler`] trait and [`SessionEvent`] enum for
//!   observing a session.
//! - [`prompt`] has [`SystemPromptBuilder`] and the router/agent prompts.

pub mod config;
pub mod conversation;
pub mod events;
pub mod orchestrator;
pub mod prompt;
pub mod router;

pub use config::AgentConfig;
pub use conversation::{ConversationalAgent, Executor};
pub use events::{
    CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, NoopHandler,
    SessionEvent,
};
pub use orchestrator::Orchestrator;
pub use prompt::SystemPromptBuilder;
pub use router::{RouterResult, RoutingError, SkillRouter};
