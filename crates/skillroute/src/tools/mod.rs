//! Tool abstractions for LLM function-calling agents.
//!
//! Every callable capability is a [`Tool`] implementor. Skills hand their
//! tools out as `Arc<dyn Tool>`, and the conversational agent collects them
//! into a [`ToolSet`]: ordered, unique by name, grown by [`ToolSet::merge`].
//!
//! # Defining tools
//!
//! - **[`FnTool`]** — closure-based, auto-parses arguments. Best for simple tools.
//! - **`impl Tool`** — full struct with manual [`Tool::definition()`] and
//!   [`Tool::execute()`]. Best for tools with state.
//!
//! # Submodules
//!
//! - [`core`] — [`Tool`] trait, [`ToolSet`], [`FnTool`], argument helpers.
//! - [`names`] — tool name constants for the built-in skills.

pub mod core;
pub mod names;

pub use core::{FnTool, MergeReport, Tool, ToolFuture, ToolSet};
pub use core::{
    DEFAULT_MAX_RESULT_BYTES, parse_tool_args, truncate_result, validate_tool_arguments,
};
