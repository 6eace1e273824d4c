//! The language-model collaborator.
//!
//! Both the router and the conversational agent talk to the model through
//! [`ChatModel`]: an ordered list of role-tagged messages (plus optional tool
//! definitions) goes in, one assistant reply comes out. The trait returns a
//! boxed future so it stays dyn-compatible and can be shared as
//! `Arc<dyn ChatModel>`.

use crate::{ChatCompletion, ChatRequest, OpenRouterClient};
use futures::future::BoxFuture;

/// Boxed future returned by [`ChatModel::chat`].
pub type ModelFuture<'a> = BoxFuture<'a, Result<ChatCompletion, String>>;

/// A chat-completion backend.
///
/// Errors are plain strings so the retry module can classify them
/// (`HTTP 429`, `timed out`, ...). Callers wrap them into
/// [`Error`](crate::Error) at their own boundary.
pub trait ChatModel: Send + Sync {
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> ModelFuture<'a>;
}

impl ChatModel for OpenRouterClient {
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> ModelFuture<'a> {
        Box::pin(OpenRouterClient::chat(self, request))
    }
}
