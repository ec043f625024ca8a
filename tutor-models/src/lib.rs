//! Model provider layer for tutor.
//!
//! This crate provides:
//! - [`ModelProvider`] - unified chat-completion interface
//! - [`OpenAiProvider`] - OpenAI-compatible HTTP provider with a bounded
//!   request timeout
//!
//! Provider failures surface as [`Error`] values; they never propagate as
//! panics past the provider boundary, which is what lets callers degrade
//! gracefully when an evaluation call fails.

mod error;

pub mod providers;

pub use error::{Error, Result};
pub use providers::{
    ChatRequest, ChatResponse, Message, ModelProvider, OpenAiConfig, OpenAiProvider, Role, Usage,
};
