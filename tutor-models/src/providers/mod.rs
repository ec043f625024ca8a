//! Model provider trait and implementations.
//!
//! The [`ModelProvider`] trait is the single seam between the tutoring
//! logic and any chat-completion backend. The orchestration layer treats
//! `chat` as an opaque function from a prompt to a text completion.

mod openai;
mod types;

use async_trait::async_trait;

pub use openai::{OpenAiConfig, OpenAiProvider};
pub use types::*;

use crate::Result;

/// Trait for chat-completion providers.
///
/// Implementations must be total over their own failure modes: transport
/// errors, bad status codes, and timeouts all come back as `Err`, never as
/// a panic.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider identifier (e.g. "openai").
    fn name(&self) -> &str;

    /// Perform a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl ModelProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(ChatResponse {
                content: format!("Echo: {last}"),
                usage: Usage::new(10, 5),
            })
        }
    }

    #[tokio::test]
    async fn provider_trait_is_object_safe() {
        let provider: Box<dyn ModelProvider> = Box::new(EchoProvider);
        let request = ChatRequest::new("test-model", vec![Message::user("Hello")]);
        let response = provider.chat(request).await.unwrap();

        assert_eq!(provider.name(), "echo");
        assert_eq!(response.content, "Echo: Hello");
        assert_eq!(response.usage.total_tokens, 15);
    }
}
