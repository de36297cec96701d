use anyhow::Result;
use async_trait::async_trait;

use super::{Message, ToolCall};
use crate::tools::Tool;

/// Response from an LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The message content
    pub message: Message,
    /// Tool calls requested by the LLM
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// A final answer with no tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            tool_calls: Vec::new(),
        }
    }

    /// A turn that only requests tool calls
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            message: Message::assistant(""),
            tool_calls,
        }
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send messages to the LLM and get a response
    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[&dyn Tool],
    ) -> Result<LlmResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}
