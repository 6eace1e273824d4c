//! End-to-end session tests against a scripted model.
//!
//! The model double answers routing calls by keyword and drives one tool
//! round for conversational calls that carry tools, so these tests walk the
//! whole route → load → rebuild → tool loop path without a network.

use std::sync::{Arc, Mutex};

use skillroute::model::{ChatModel, ModelFuture};
use skillroute::prelude::*;
use skillroute::skills::builtin::{calculator, weather};
use skillroute::{ChatCompletion, MessageRole, ToolCall};

/// Routes by keyword; answers weather turns with one `get_weather` call.
#[derive(Default)]
struct KeywordModel {
    requests: Mutex<Vec<ChatRequest>>,
}

impl KeywordModel {
    fn respond(request: &ChatRequest) -> ChatCompletion {
        let system = request.messages[0].text();
        let user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.text().to_lowercase())
            .unwrap_or_default();

        if system.contains("skill router") {
            let skills = if user.contains("weather") {
                r#"["weather"]"#
            } else {
                "[]"
            };
            return ChatCompletion::text_reply(format!(
                r#"{{"skills": {skills}, "reasoning": "keyword match"}}"#
            ));
        }

        let last = request.messages.last().map(|m| m.role.clone());
        let has_weather_tool = request
            .tools
            .iter()
            .flatten()
            .any(|t| t.function.name == "get_weather");

        if last == Some(MessageRole::Tool) {
            let result = request.messages.last().map(|m| m.text()).unwrap_or_default();
            ChatCompletion::text_reply(format!("Here you go. {result}"))
        } else if has_weather_tool && user.contains("weather") {
            ChatCompletion::tool_calls(vec![ToolCall::new(
                "call-1",
                "get_weather",
                r#"{"location": "Paris"}"#,
            )])
        } else {
            ChatCompletion::text_reply("Hi! How can I help?")
        }
    }

    fn conversational_requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.messages[0].text().contains("skill router"))
            .cloned()
            .collect()
    }
}

impl ChatModel for KeywordModel {
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> ModelFuture<'a> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = Self::respond(request);
        Box::pin(async move { Ok(reply) })
    }
}

fn session(model: Arc<KeywordModel>) -> Orchestrator {
    let mut orch = Orchestrator::with_builtin_skills(model, AgentConfig::new("test-model"));
    orch.initialize().unwrap();
    orch
}

fn tool_names(request: &ChatRequest) -> Vec<String> {
    request
        .tools
        .iter()
        .flatten()
        .map(|t| t.function.name.clone())
        .collect()
}

#[tokio::test]
async fn greeting_loads_no_skills() {
    let model = Arc::new(KeywordModel::default());
    let mut orch = session(model.clone());

    let reply = orch.run("hello").await.unwrap();

    assert_eq!(reply, "Hi! How can I help?");
    assert!(orch.get_loaded_skills().is_empty());
    assert!(orch.active_tool_names().is_empty());
    assert_eq!(orch.history_len(), 2);
    assert!(model.conversational_requests()[0].tools.is_none());
}

#[tokio::test]
async fn weather_question_loads_only_weather_tools() {
    let model = Arc::new(KeywordModel::default());
    let mut orch = session(model.clone());

    let reply = orch.run("What's the weather in Paris?").await.unwrap();

    assert!(reply.starts_with("Here you go. Weather in Paris:"), "{reply}");
    assert_eq!(orch.get_loaded_skills(), vec!["weather"]);
    for request in model.conversational_requests() {
        assert_eq!(tool_names(&request), vec!["get_weather", "get_forecast"]);
    }
    // Tool traffic stays out of history.
    assert_eq!(orch.history_len(), 2);
}

#[tokio::test]
async fn repeat_weather_question_reuses_executor() {
    let model = Arc::new(KeywordModel::default());
    let mut orch = session(model);

    orch.run("weather in Paris?").await.unwrap();
    let generation = orch.executor_generation();
    orch.run("weather in Paris again?").await.unwrap();

    assert_eq!(orch.executor_generation(), generation);
    assert_eq!(orch.get_loaded_skills(), vec!["weather"]);
    assert_eq!(orch.history_len(), 4);
}

#[tokio::test]
async fn clear_history_starts_over() {
    let model = Arc::new(KeywordModel::default());
    let mut orch = session(model.clone());
    orch.run("weather in Paris?").await.unwrap();

    orch.clear_history().unwrap();

    assert_eq!(orch.history_len(), 0);
    assert!(orch.get_loaded_skills().is_empty());
    assert!(orch.active_tool_names().is_empty());

    orch.run("hello").await.unwrap();
    let last = model.conversational_requests().pop().unwrap();
    assert!(last.tools.is_none());
    // system + user only: nothing from before the reset.
    assert_eq!(last.messages.len(), 2);
}

#[tokio::test]
async fn two_skill_registry_walkthrough() {
    let registry = SkillRegistry::new()
        .with(calculator::skill())
        .with(weather::skill());
    let model = Arc::new(KeywordModel::default());
    let mut orch = Orchestrator::new(model, AgentConfig::default(), registry);
    orch.initialize().unwrap();

    orch.run("hello").await.unwrap();
    assert!(orch.get_loaded_skills().is_empty());
    assert!(orch.active_tool_names().is_empty());

    orch.run("what's the weather in Paris").await.unwrap();
    assert_eq!(orch.get_loaded_skills(), vec!["weather"]);
    assert_eq!(orch.active_tool_names(), vec!["get_weather", "get_forecast"]);
    let generation = orch.executor_generation();

    let reply = orch.run("and the weather tomorrow?").await.unwrap();
    assert!(reply.starts_with("Here you go."));
    assert_eq!(orch.executor_generation(), generation);

    let names: Vec<String> = orch
        .get_available_skills()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["calculator", "weather"]);
}

#[tokio::test]
async fn shutdown_closes_the_session() {
    let model = Arc::new(KeywordModel::default());
    let mut orch = session(model);

    orch.shutdown().unwrap();

    assert!(matches!(
        orch.run("hello").await,
        Err(Error::NotInitialized { .. })
    ));
    orch.initialize().unwrap();
    assert_eq!(orch.run("hello").await.unwrap(), "Hi! How can I help?");
}
