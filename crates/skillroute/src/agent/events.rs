//! Session events and handlers.
//!
//! The orchestrator and the conversational agent report what they decide
//! through [`SessionEvent`] values. Implement [`EventHandler`] to observe
//! them for logging, UI updates, or metrics.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures |
//! | [`CompositeEventHandler`] | Fan out to several handlers in order |

use tracing::{debug, info, warn};

/// Events emitted while a session runs.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// The router picked skills for the current turn.
    Routed {
        skills: &'a [String],
        reasoning: &'a str,
    },
    /// A skill's tools were handed out for the first time this session.
    SkillLoaded { name: &'a str, tools: &'a [String] },
    /// The conversational agent rebuilt its executor.
    ExecutorRebuilt {
        generation: u64,
        tools: &'a [String],
        skipped: &'a [String],
    },
    /// A model round-trip is starting.
    RoundStart { round: u32, max_rounds: u32 },
    /// A tool is about to run.
    ToolExecuting { name: &'a str, arguments: &'a str },
    /// A tool finished.
    ToolResult {
        name: &'a str,
        call_id: &'a str,
        result: &'a str,
    },
    /// The model produced text.
    Text(&'a str),
    /// Token usage reported for one round.
    TokenUsage {
        prompt_tokens: u32,
        completion_tokens: u32,
    },
    /// The turn used every allowed round without a text-only reply.
    RoundLimitReached { max_rounds: u32 },
    /// History, tool set, and loaded skills were reset.
    HistoryCleared,
}

/// Observer for session events. The default implementation ignores them.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &SessionEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let SessionEvent::Text(text) = event {
///         println!("{text}");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&SessionEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&SessionEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&SessionEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &SessionEvent<'_>) {
        (self.0)(event)
    }
}

/// Delivers each event to every inner handler, in registration order.
///
/// ```ignore
/// let handler = CompositeEventHandler::new()
///     .with(LoggingHandler)
///     .with(my_ui_handler);
/// ```
#[derive(Default)]
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Add a handler only when `condition` holds.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &SessionEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// Logs events via `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &SessionEvent<'_>) {
        match event {
            SessionEvent::Routed { skills, reasoning } => {
                if skills.is_empty() {
                    debug!("Router selected no skills ({reasoning})");
                } else {
                    info!("Router selected {skills:?} ({reasoning})");
                }
            }
            SessionEvent::SkillLoaded { name, tools } => {
                info!("Skill '{name}' loaded with tools {tools:?}");
            }
            SessionEvent::ExecutorRebuilt {
                generation,
                tools,
                skipped,
            } => {
                info!("Executor #{generation} rebuilt with {} tool(s)", tools.len());
                if !skipped.is_empty() {
                    debug!("  duplicate tools skipped: {skipped:?}");
                }
            }
            SessionEvent::RoundStart { round, max_rounds } => {
                debug!("[round {round}/{max_rounds}]");
            }
            SessionEvent::ToolExecuting { name, .. } => {
                debug!("Executing tool: {name}");
            }
            SessionEvent::ToolResult { name, result, .. } => {
                debug!("Tool {name} result: {} bytes", result.len());
            }
            SessionEvent::Text(text) => {
                let preview: String = text.chars().take(200).collect();
                debug!(
                    "LLM text: {preview}{}",
                    if text.len() > 200 { "..." } else { "" }
                );
            }
            SessionEvent::TokenUsage {
                prompt_tokens,
                completion_tokens,
            } => {
                debug!("Tokens: prompt={prompt_tokens}, completion={completion_tokens}");
            }
            SessionEvent::RoundLimitReached { max_rounds } => {
                warn!("Turn hit round limit ({max_rounds})");
            }
            SessionEvent::HistoryCleared => {
                info!("Session history cleared");
            }
        }
    }
}
