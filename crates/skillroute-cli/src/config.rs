//! Command-line settings and their conversion into library config.

use skillroute::agent::AgentConfig;

/// Settings collected from command-line flags.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Model for conversational turns. Default: `"anthropic/claude-sonnet-4"`.
    pub model: String,
    /// Model for routing calls. Default: same as `model`.
    pub router_model: Option<String>,
    /// Maximum model round-trips per turn. Default: `8`.
    pub max_rounds: u32,
    /// Maximum tokens per response. Default: `4096`.
    pub max_tokens: u32,
    /// Sampling temperature. Default: `0.7`.
    pub temperature: f32,
    /// Retries for transient provider errors. Default: `2`.
    pub retries: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            model: skillroute::DEFAULT_MODEL.to_string(),
            router_model: None,
            max_rounds: 8,
            max_tokens: 4096,
            temperature: 0.7,
            retries: 2,
        }
    }
}

impl CliConfig {
    /// Build the [`AgentConfig`] for an interactive session.
    pub fn build_agent_config(&self) -> AgentConfig {
        let config = AgentConfig::new(self.model.clone())
            .with_max_rounds(self.max_rounds)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_retries(self.retries);
        match &self.router_model {
            Some(model) => config.with_router_model(model.clone()),
            None => config,
        }
    }
}
