mod backend;
mod message;
mod output;
mod provider;

use std::sync::Arc;

pub use backend::{AnthropicProvider, OpenAIProvider};
pub use message::{Message, MessageRole, ToolCall, ToolResult};
pub use output::{parse_structured, strip_code_fence};
pub use provider::{LlmProvider, LlmResponse};

use crate::config::{LlmBackendKind, LlmSettings};

/// Build the provider selected in the settings
pub fn create_provider(settings: &LlmSettings) -> Arc<dyn LlmProvider> {
    match settings.backend {
        LlmBackendKind::OpenAI => Arc::new(OpenAIProvider::new(
            settings.model.clone(),
            settings.api_key.clone(),
        )),
        LlmBackendKind::Anthropic => Arc::new(AnthropicProvider::new(
            settings.model.clone(),
            settings.api_key.clone(),
        )),
    }
}
