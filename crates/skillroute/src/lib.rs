//! On-demand skill loading for LLM tool-use agents.
//!
//! `skillroute` keeps an agent's tool list small. Instead of describing every
//! tool up front, a cheap routing call looks at the user's turn and the
//! metadata-only skill catalog, picks the skills the turn needs, and only
//! those skills' tools are handed to the conversational agent. Tools
//! accumulate across the session until the history is cleared.
//!
//! # Getting started
//!
//! ```ignore
//! use skillroute::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> skillroute::Result<()> {
//!     let api_key = std::env::var("OPENROUTER_KEY").unwrap();
//!     let client = OpenRouterClient::new(api_key).map_err(skillroute::Error::Configuration)?;
//!
//!     let config = AgentConfig::new("anthropic/claude-sonnet-4")
//!         .with_router_model("anthropic/claude-3.5-haiku");
//!
//!     let mut session = Orchestrator::with_builtin_skills(Arc::new(client), config)
//!         .with_event_handler(Arc::new(LoggingHandler));
//!     session.initialize()?;
//!
//!     println!("{}", session.run("What's the weather in Paris?").await?);
//!     println!("loaded: {:?}", session.get_loaded_skills());
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Skills and their lifecycle:** [`Skill`](skills::Skill),
//!   [`SkillMetadata`](skills::SkillMetadata) and the
//!   [`SkillRegistry`](skills::SkillRegistry). Built-in skills live in
//!   [`skills::builtin`].
//! - **Tools:** the [`Tool`](tools::Tool) trait, [`FnTool`](tools::FnTool)
//!   for closure-based tools, and the ordered, name-unique
//!   [`ToolSet`](tools::ToolSet).
//! - **The per-turn protocol:** [`Orchestrator`](agent::Orchestrator) composes
//!   the [`SkillRouter`](agent::SkillRouter) and the
//!   [`ConversationalAgent`](agent::ConversationalAgent).
//! - **Observability:** implement [`EventHandler`](agent::EventHandler) or use
//!   [`LoggingHandler`](agent::LoggingHandler).
//! - **The model seam:** [`ChatModel`](model::ChatModel). [`OpenRouterClient`]
//!   implements it; tests substitute scripted doubles.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`agent`] | Orchestrator, router, conversational agent, config, events, prompts |
//! | [`skills`] | Skill trait, metadata, registry, built-in skills |
//! | [`tools`] | Tool trait, `FnTool`, `ToolSet` merge and dispatch |
//! | [`model`] | `ChatModel` collaborator trait |
//! | [`api`] | Retry with backoff for provider calls |
//! | [`error`] | Crate error type |

pub mod agent;
pub mod api;
pub mod error;
pub mod model;
pub mod prelude;
pub mod skills;
pub mod tools;

pub use error::{Error, Result};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// Re-export schemars for downstream skill authors.
pub use schemars;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for conversational turns.
pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4";

/// Maximum tokens for the routing call. Routing replies are a small JSON object.
pub const ROUTER_MAX_TOKENS: u32 = 512;

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`.
///
/// # Example
///
/// ```
/// use skillroute::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct WeatherArgs {
///     location: String,
///     #[serde(default)]
///     unit: Option<String>,
/// }
///
/// let schema = json_schema_for::<WeatherArgs>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"location".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body (OpenAI-compatible). Unused optional fields
/// are omitted from serialization.
#[derive(Serialize, Clone, Debug, Default)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDef>>,
}

impl ChatRequest {
    /// Number of tool definitions attached to the request.
    pub fn tool_count(&self) -> usize {
        self.tools.as_ref().map_or(0, |t| t.len())
    }
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// One fragment of a multi-part message body.
///
/// Providers may return kinds this crate does not know about; those decode
/// as [`ContentPart::Unknown`] instead of failing the whole response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: serde_json::Value },
    #[serde(other)]
    Unknown,
}

/// Message body: either a single string or a sequence of fragments.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// The textual content. For multi-part bodies, text fragments are
    /// concatenated in order and every other fragment kind is dropped.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(s) => s.is_empty(),
            MessageContent::Parts(parts) => parts.is_empty(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(content.into())),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_text(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_text(MessageRole::User, content)
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self::with_text(MessageRole::Assistant, content)
    }

    pub fn assistant_tool_calls(content: Option<MessageContent>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(MessageContent::Text(content.into())),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    /// Text content of the message, or an empty string.
    pub fn text(&self) -> String {
        self.content.as_ref().map(|c| c.text()).unwrap_or_default()
    }
}

// ── Tool types ─────────────────────────────────────────────────────

/// The type of a tool definition. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ToolType {
    #[serde(rename = "function")]
    Function,
}

/// Tool definition sent to the API (OpenAI function-calling format).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionDef,
}

impl ToolDef {
    /// Create a function-calling tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: ToolType::Function,
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The type of a tool call. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum CallType {
    #[serde(rename = "function")]
    Function,
}

/// A tool call returned by the model.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub function: FunctionCallData,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: CallType::Function,
            function: FunctionCallData {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FunctionCallData {
    pub name: String,
    pub arguments: String,
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<MessageContent>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// One assistant reply, as returned by a [`ChatModel`](model::ChatModel).
#[derive(Debug, Clone, Default)]
pub struct ChatCompletion {
    pub content: Option<MessageContent>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    /// A text-only completion.
    pub fn text_reply(text: impl Into<String>) -> Self {
        Self {
            content: Some(MessageContent::Text(text.into())),
            finish_reason: Some("stop".into()),
            ..Default::default()
        }
    }

    /// A completion that requests tool calls.
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            finish_reason: Some("tool_calls".into()),
            ..Default::default()
        }
    }

    /// Text content with non-text fragments dropped. Empty when absent.
    pub fn text(&self) -> String {
        self.content.as_ref().map(|c| c.text()).unwrap_or_default()
    }
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the OpenRouter chat completions API.
pub struct OpenRouterClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) referer: String,
    pub(crate) title: String,
}

impl OpenRouterClient {
    /// Create a new client with the given API key and default headers.
    pub fn new(api_key: impl Into<String>) -> std::result::Result<Self, String> {
        Self::with_headers(api_key, "https://github.com/skillroute", "skillroute")
    }

    /// Create a new client with custom Referer and X-Title headers.
    pub fn with_headers(
        api_key: impl Into<String>,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> std::result::Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("skillroute/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            referer: referer.into(),
            title: title.into(),
        })
    }

    /// Send a chat completion request.
    pub async fn chat(&self, body: &ChatRequest) -> std::result::Result<ChatCompletion, String> {
        let model_label = body.model.as_deref().unwrap_or("(none)");
        debug!(
            "LLM request: model={}, messages={}, tools={}, max_tokens={}, temp={:?}",
            model_label,
            body.messages.len(),
            body.tool_count(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("OpenRouter API HTTP {status}: {text}"));
        }

        parse_chat_response(&text)
    }
}

/// Decode a raw chat-completions response body.
pub(crate) fn parse_chat_response(text: &str) -> std::result::Result<ChatCompletion, String> {
    let parsed: RawChatResponse =
        serde_json::from_str(text).map_err(|e| format!("failed to parse response: {e}"))?;

    if let Some(err) = parsed.error {
        return Err(format!("OpenRouter API error: {}", err.message));
    }

    if let Some(ref usage) = parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        );
    }

    let Some(choice) = parsed.choices.and_then(|c| c.into_iter().next()) else {
        debug!("LLM output: empty (no choices)");
        return Ok(ChatCompletion {
            usage: parsed.usage,
            ..Default::default()
        });
    };

    let tool_calls = choice.message.tool_calls.unwrap_or_default();
    debug!(
        "LLM output: {} chars text, {} tool call(s)",
        choice.message.content.as_ref().map_or(0, |c| c.text().len()),
        tool_calls.len()
    );

    Ok(ChatCompletion {
        content: choice.message.content,
        tool_calls,
        usage: parsed.usage,
        finish_reason: choice.finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.text(), "hello");

        let user = Message::user("world");
        assert_eq!(user.role, MessageRole::User);

        let tool = Message::tool_result("call-1", "result");
        assert_eq!(tool.role, MessageRole::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call-1"));
    }

    #[test]
    fn chat_request_default_skips_none_fields() {
        let req = ChatRequest {
            model: Some("test-model".into()),
            messages: vec![Message::user("hi")],
            max_tokens: 100,
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("top_p").is_none());
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn string_content_is_taken_verbatim() {
        let body = r#"{"choices":[{"message":{"content":"plain answer"},"finish_reason":"stop"}]}"#;
        let completion = parse_chat_response(body).unwrap();
        assert_eq!(completion.text(), "plain answer");
        assert!(completion.tool_calls.is_empty());
    }

    #[test]
    fn fragment_content_keeps_only_text() {
        let body = r#"{"choices":[{"message":{"content":[
            {"type":"text","text":"It is "},
            {"type":"image_url","image_url":{"url":"https://x/y.png"}},
            {"type":"reasoning","summary":"hidden"},
            {"type":"text","text":"sunny."}
        ]}}]}"#;
        let completion = parse_chat_response(body).unwrap();
        assert_eq!(completion.text(), "It is sunny.");
    }

    #[test]
    fn api_error_body_is_an_error() {
        let body = r#"{"error":{"message":"no credits"}}"#;
        let err = parse_chat_response(body).unwrap_err();
        assert!(err.contains("no credits"));
    }

    #[test]
    fn empty_choices_yield_empty_completion() {
        let completion = parse_chat_response(r#"{"choices":[]}"#).unwrap();
        assert!(completion.content.is_none());
        assert_eq!(completion.text(), "");
    }

    #[test]
    fn tool_calls_are_decoded() {
        let body = r#"{"choices":[{"message":{"content":null,"tool_calls":[
            {"id":"c1","type":"function","function":{"name":"get_weather","arguments":"{\"location\":\"Paris\"}"}}
        ]},"finish_reason":"tool_calls"}]}"#;
        let completion = parse_chat_response(body).unwrap();
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].function.name, "get_weather");
    }
}
