//! Configuration for the router and the conversational agent.
//!
//! # Examples
//!
//! ```
//! use skillroute::agent::config::AgentConfig;
//!
//! let config = AgentConfig::new("anthropic/claude-sonnet-4")
//!     .with_router_model("anthropic/claude-3.5-haiku")
//!     .with_max_rounds(6)
//!     .with_retries(2);
//!
//! assert_eq!(config.router_model(), "anthropic/claude-3.5-haiku");
//! assert_eq!(config.retry.max_retries, 2);
//! ```

use super::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::api::retry::RetryConfig;
use crate::tools::{DEFAULT_MAX_RESULT_BYTES, ToolSet};
use std::time::Duration;

/// Settings shared by one [`Orchestrator`](super::Orchestrator) session.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model for conversational turns.
    pub model: String,
    /// Model for routing calls. Falls back to `model` when unset.
    pub router_model: Option<String>,
    /// Base system prompt for conversational turns. A section listing the
    /// active tools is appended on every executor rebuild.
    pub system_prompt: String,
    /// Maximum model round-trips per turn (each tool-call round counts).
    pub max_rounds: u32,
    /// Maximum tokens per conversational response.
    pub max_tokens: u32,
    /// Sampling temperature for conversational turns.
    pub temperature: f32,
    /// Maximum tokens for the routing reply.
    pub router_max_tokens: u32,
    /// Sampling temperature for routing. Zero keeps routing as repeatable as the provider allows.
    pub router_temperature: f32,
    /// Retry policy applied to both model calls of a turn.
    pub retry: RetryConfig,
    /// Per-tool execution timeout. `None` disables it.
    pub tool_timeout: Option<Duration>,
    /// Tool results longer than this are truncated before reaching the model.
    pub max_tool_result_bytes: usize,
    /// Validate tool arguments against their JSON Schema before execution.
    pub validate_tool_args: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: crate::DEFAULT_MODEL.to_string(),
            router_model: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_rounds: 8,
            max_tokens: 4096,
            temperature: 0.7,
            router_max_tokens: crate::ROUTER_MAX_TOKENS,
            router_temperature: 0.0,
            retry: RetryConfig::default(),
            tool_timeout: Some(Duration::from_secs(30)),
            max_tool_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            validate_tool_args: true,
        }
    }
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_router_model(mut self, model: impl Into<String>) -> Self {
        self.router_model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retry = RetryConfig::with_retries(retries);
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_arg_validation(mut self, enabled: bool) -> Self {
        self.validate_tool_args = enabled;
        self
    }

    /// The model used for routing calls.
    pub fn router_model(&self) -> &str {
        self.router_model.as_deref().unwrap_or(&self.model)
    }

    /// An empty [`ToolSet`] carrying this config's dispatch settings.
    pub fn empty_tool_set(&self) -> ToolSet {
        ToolSet::new()
            .with_max_result_bytes(self.max_tool_result_bytes)
            .with_arg_validation(self.validate_tool_args)
            .with_default_timeout(self.tool_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_model_falls_back_to_main_model() {
        let config = AgentConfig::new("main-model");
        assert_eq!(config.router_model(), "main-model");
        let config = config.with_router_model("cheap-model");
        assert_eq!(config.router_model(), "cheap-model");
    }

    #[test]
    fn defaults_are_routing_friendly() {
        let config = AgentConfig::default();
        assert_eq!(config.router_temperature, 0.0);
        assert_eq!(config.router_max_tokens, crate::ROUTER_MAX_TOKENS);
        assert_eq!(config.max_rounds, 8);
        assert!(config.validate_tool_args);
    }
}
