//! The skill router.
//!
//! A single stateless model call per turn: the user's text plus a
//! metadata-only catalog go in, a list of skill names comes out. The router
//! never executes tools and keeps no history. Failures degrade to "no skills"
//! so a broken routing call never breaks the conversation.

use super::config::AgentConfig;
use super::prompt::{router_prompt, skill_catalog};
use crate::api::retry::{RetryConfig, retry_with_backoff};
use crate::model::ChatModel;
use crate::skills::SkillMetadata;
use crate::{ChatRequest, Message};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// The router's decision for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouterResult {
    /// Skill names to load. Names are not validated here.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_reasoning")]
    pub reasoning: String,
}

fn default_reasoning() -> String {
    "n/a".to_string()
}

impl RouterResult {
    /// The "no skills" result carrying a failure diagnostic.
    pub fn degraded(error: &RoutingError) -> Self {
        Self {
            skills: Vec::new(),
            reasoning: error.to_string(),
        }
    }
}

/// Why a routing call produced no usable decision. Never escapes the router.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("No JSON response")]
    NoJson,

    #[error("invalid routing JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("routing call failed: {0}")]
    Invocation(String),
}

/// Extract the routing decision from a model reply.
///
/// The JSON object is taken from the first `{` to the last `}`, so prose or
/// code fences around it are tolerated.
pub fn parse_router_response(text: &str) -> Result<RouterResult, RoutingError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(RoutingError::NoJson);
    };
    let json = text
        .get(start..=end)
        .filter(|_| start < end)
        .ok_or(RoutingError::NoJson)?;
    Ok(serde_json::from_str(json)?)
}

/// Picks the skills a turn needs.
pub struct SkillRouter {
    model: Arc<dyn ChatModel>,
    model_name: String,
    max_tokens: u32,
    temperature: f32,
    retry: RetryConfig,
    system_prompt: String,
}

impl SkillRouter {
    /// Snapshot the catalog of `skills` into the routing prompt.
    pub fn new(model: Arc<dyn ChatModel>, config: &AgentConfig, skills: &[SkillMetadata]) -> Self {
        Self {
            model,
            model_name: config.router_model().to_string(),
            max_tokens: config.router_max_tokens,
            temperature: config.router_temperature,
            retry: config.retry.clone(),
            system_prompt: router_prompt(&skill_catalog(skills)),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Route one turn. Never fails: errors come back as an empty selection
    /// with the diagnostic in `reasoning`.
    pub async fn run(&self, user_text: &str) -> RouterResult {
        match self.try_route(user_text).await {
            Ok(result) => {
                debug!(
                    "Routing decision: skills={:?}, reasoning={}",
                    result.skills, result.reasoning
                );
                result
            }
            Err(e) => {
                warn!("Routing failed, continuing without new skills: {e}");
                RouterResult::degraded(&e)
            }
        }
    }

    async fn try_route(&self, user_text: &str) -> Result<RouterResult, RoutingError> {
        let request = ChatRequest {
            model: Some(self.model_name.clone()),
            messages: vec![
                Message::system(self.system_prompt.as_str()),
                Message::user(user_text),
            ],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            ..Default::default()
        };
        let completion = retry_with_backoff(&self.retry, || self.model.chat(&request))
            .await
            .map_err(RoutingError::Invocation)?;
        parse_router_response(&completion.text())
    }
}
