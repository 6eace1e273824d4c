//! Convenience re-exports for common `skillroute` types.
//!
//! ```ignore
//! use skillroute::prelude::*;
//! ```
//!
//! Pulls in the client, message types, the orchestrator and its config,
//! event handlers, and the skill and tool traits. Built-in skill constructors
//! and the retry helpers stay in their modules.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ChatRequest, Message, OpenRouterClient, ToolDef, json_schema_for};
pub use crate::Error;

// ── Agent runtime ───────────────────────────────────────────────────
pub use crate::agent::{
    AgentConfig, CompositeEventHandler, ConversationalAgent, EventHandler, FnEventHandler,
    LoggingHandler, NoopHandler, Orchestrator, RouterResult, SessionEvent, SkillRouter,
    SystemPromptBuilder,
};
pub use crate::model::ChatModel;

// ── Skills ──────────────────────────────────────────────────────────
pub use crate::skills::{Skill, SkillMetadata, SkillRegistry, SkillSummary};

// ── Tools ───────────────────────────────────────────────────────────
pub use crate::tools::{FnTool, MergeReport, Tool, ToolFuture, ToolSet, parse_tool_args};
