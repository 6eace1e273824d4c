//! The conversational agent.
//!
//! Owns the session history and the accumulated tool set. Each turn runs a
//! tool-use loop against the current [`Executor`]: the model may call tools
//! for up to `max_rounds` round-trips before it must answer in text.
//!
//! The executor is a snapshot of the tool set plus the system prompt that
//! describes it. [`ConversationalAgent::build_executor`] merges new tools and
//! always builds a fresh executor, so a model that only reads its tool list
//! at construction still sees the current one.

use super::config::AgentConfig;
use super::events::{EventHandler, SessionEvent};
use super::prompt::conversation_prompt;
use crate::api::retry::retry_with_backoff;
use crate::error::{Error, Result};
use crate::model::ChatModel;
use crate::tools::{MergeReport, Tool, ToolSet};
use crate::{ChatCompletion, ChatRequest, Message, ToolCall, ToolDef};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The tools and prompt one turn runs against.
pub struct Executor {
    tools: ToolSet,
    definitions: Vec<ToolDef>,
    system_prompt: String,
    generation: u64,
}

impl Executor {
    fn build(tools: &ToolSet, base_prompt: &str, generation: u64) -> Self {
        Self {
            tools: tools.clone(),
            definitions: tools.definitions(),
            system_prompt: conversation_prompt(base_prompt, &tools.names()),
            generation,
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Counts builds since the agent was created, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn tool_defs(&self) -> Option<Vec<ToolDef>> {
        (!self.definitions.is_empty()).then(|| self.definitions.clone())
    }
}

/// The tool-using conversational agent.
pub struct ConversationalAgent {
    model: Arc<dyn ChatModel>,
    config: AgentConfig,
    tools: ToolSet,
    history: Vec<Message>,
    executor: Option<Executor>,
    generation: u64,
    handler: Arc<dyn EventHandler>,
}

impl ConversationalAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        config: AgentConfig,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        let tools = config.empty_tool_set();
        Self {
            model,
            config,
            tools,
            history: Vec::new(),
            executor: None,
            generation: 0,
            handler,
        }
    }

    /// Build the first executor with an empty tool set.
    pub fn initialize(&mut self) {
        self.tools.clear();
        self.build_executor(&[]);
    }

    pub fn is_initialized(&self) -> bool {
        self.executor.is_some()
    }

    /// Merge `new_tools` into the tool set (first occurrence of a name wins)
    /// and rebuild the executor, even when nothing was added.
    pub fn build_executor(&mut self, new_tools: &[Arc<dyn Tool>]) -> MergeReport {
        let report = self.tools.merge(new_tools);
        self.generation += 1;
        let executor = Executor::build(&self.tools, &self.config.system_prompt, self.generation);

        let names = executor.tool_names();
        info!(
            "Executor #{} built with {} tool(s) (+{} new, {} duplicate)",
            self.generation,
            names.len(),
            report.added.len(),
            report.skipped.len()
        );
        self.handler.on_event(&SessionEvent::ExecutorRebuilt {
            generation: self.generation,
            tools: &names,
            skipped: &report.skipped,
        });

        self.executor = Some(executor);
        report
    }

    /// Drop every accumulated tool. The next [`build_executor`](Self::build_executor)
    /// starts from an empty set.
    pub fn reset_tools(&mut self) {
        self.tools.clear();
    }

    /// Run one conversational turn.
    ///
    /// The user message and the final assistant text are appended to history
    /// only after the turn succeeds. A failed turn leaves history untouched.
    pub async fn run(&mut self, user_text: &str) -> Result<String> {
        let executor = self
            .executor
            .as_ref()
            .ok_or_else(|| Error::not_initialized("conversational agent"))?;

        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(executor.system_prompt()));
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(user_text));

        let tool_defs = executor.tool_defs();
        let max_rounds = self.config.max_rounds.max(1);
        let mut text_output: Vec<String> = Vec::new();
        let mut final_text = None;

        for round in 1..=max_rounds {
            self.handler
                .on_event(&SessionEvent::RoundStart { round, max_rounds });

            let completion = self.send_round(&messages, &tool_defs).await?;

            let text = completion.text();
            if !text.is_empty() {
                self.handler.on_event(&SessionEvent::Text(&text));
                text_output.push(text.clone());
            }

            if completion.tool_calls.is_empty() {
                final_text = Some(text);
                break;
            }

            messages.push(Message::assistant_tool_calls(
                completion.content.clone(),
                completion.tool_calls.clone(),
            ));
            let results = execute_tool_calls(
                &executor.tools,
                &completion.tool_calls,
                self.handler.as_ref(),
            )
            .await;
            messages.extend(results);
        }

        let reply = match final_text {
            Some(text) => text,
            None => {
                warn!("Turn used all {max_rounds} round(s) without a final answer");
                self.handler
                    .on_event(&SessionEvent::RoundLimitReached { max_rounds });
                text_output.join("\n\n")
            }
        };

        self.history.push(Message::user(user_text));
        self.history.push(Message::assistant_text(reply.as_str()));
        Ok(reply)
    }

    async fn send_round(
        &self,
        messages: &[Message],
        tool_defs: &Option<Vec<ToolDef>>,
    ) -> Result<ChatCompletion> {
        let request = ChatRequest {
            model: Some(self.config.model.clone()),
            messages: messages.to_vec(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            tools: tool_defs.clone(),
            ..Default::default()
        };
        let completion = retry_with_backoff(&self.config.retry, || self.model.chat(&request))
            .await
            .map_err(Error::Invocation)?;

        if let Some(usage) = &completion.usage {
            self.handler.on_event(&SessionEvent::TokenUsage {
                prompt_tokens: usage.prompt_tokens.unwrap_or(0),
                completion_tokens: usage.completion_tokens.unwrap_or(0),
            });
        }
        Ok(completion)
    }

    /// Empty the conversation history. The tool set and executor stay.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Replace the handler that receives this agent's events.
    pub fn set_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handler = handler;
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Names in the current tool set, in insertion order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }

    pub fn executor(&self) -> Option<&Executor> {
        self.executor.as_ref()
    }

    /// Number of executors built so far. Zero before `initialize`.
    pub fn executor_generation(&self) -> u64 {
        self.generation
    }
}

/// Run a round's tool calls concurrently; results come back in call order.
async fn execute_tool_calls(
    tools: &ToolSet,
    calls: &[ToolCall],
    handler: &dyn EventHandler,
) -> Vec<Message> {
    for call in calls {
        handler.on_event(&SessionEvent::ToolExecuting {
            name: &call.function.name,
            arguments: &call.function.arguments,
        });
    }
    debug!("Executing {} tool call(s)", calls.len());

    let futures = calls
        .iter()
        .map(|call| tools.execute(&call.function.name, &call.function.arguments));
    let results = futures::future::join_all(futures).await;

    calls
        .iter()
        .zip(results)
        .map(|(call, result)| {
            handler.on_event(&SessionEvent::ToolResult {
                name: &call.function.name,
                call_id: &call.id,
                result: &result,
            });
            Message::tool_result(call.id.as_str(), result)
        })
        .collect()
}
