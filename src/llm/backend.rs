use anyhow::{Context, Result};
use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatRole, FunctionTool, MessageType, Tool as LlmTool};
use secrecy::{ExposeSecret, SecretString};
use tokio::time::{Duration, timeout};
use tracing::warn;

use super::{LlmProvider, LlmResponse, Message, MessageRole, ToolCall};
use crate::tools::Tool;

const DEFAULT_MAX_TOKENS: u32 = 4096;
const API_TIMEOUT_SECS: u64 = 120;

/// Parameters for the shared LLM chat implementation
struct ChatParams<'a> {
    backend: LLMBackend,
    provider_name: &'a str,
    api_key: &'a str,
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
    tools: &'a [&'a dyn Tool],
}

/// Build llm crate tool definitions from our tools.
fn build_llm_tools(tools: &[&dyn Tool]) -> Vec<LlmTool> {
    tools
        .iter()
        .map(|t| LlmTool {
            tool_type: "function".to_string(),
            function: FunctionTool {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            },
            cache_control: None,
        })
        .collect()
}

fn build_llm_client(
    params: &ChatParams<'_>,
    llm_tools: &[LlmTool],
) -> Result<Box<dyn llm::LLMProvider>> {
    // Tools must be declared at build time, so the client is rebuilt per call.
    let mut builder = LLMBuilder::new()
        .backend(params.backend.clone())
        .api_key(params.api_key)
        .model(params.model)
        .system(params.system)
        .max_tokens(params.max_tokens);

    for tool in llm_tools {
        builder = builder.function(
            llm::builder::FunctionBuilder::new(&tool.function.name)
                .description(&tool.function.description)
                .json_schema(tool.function.parameters.clone()),
        );
    }

    builder.build().context("failed to build LLM client")
}

/// Parse tool calls from the response trait object.
///
/// Arguments that are not valid JSON are replaced by an `{"error": ..}` object so the tool
/// rejects them with a readable message instead of the whole turn failing.
fn parse_tool_calls(response: &dyn llm::chat::ChatResponse) -> Vec<ToolCall> {
    response
        .tool_calls()
        .map(|calls| {
            calls
                .iter()
                .map(|tc| {
                    let arguments = match serde_json::from_str(&tc.function.arguments) {
                        Ok(args) => args,
                        Err(e) => {
                            warn!(
                                tool = %tc.function.name,
                                error = %e,
                                "failed to parse tool call arguments as JSON"
                            );
                            serde_json::json!({
                                "error": format!("Failed to parse arguments: {}", e)
                            })
                        }
                    };
                    ToolCall {
                        id: tc.id.clone(),
                        name: tc.function.name.clone(),
                        arguments,
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

async fn chat_impl(params: ChatParams<'_>) -> Result<LlmResponse> {
    let llm_tools = build_llm_tools(params.tools);
    let llm = build_llm_client(&params, &llm_tools)?;
    let chat_messages: Vec<ChatMessage> = params.messages.iter().map(convert_message).collect();

    let api_timeout = Duration::from_secs(API_TIMEOUT_SECS);
    let timeout_msg = format!(
        "{} API call timed out after {} seconds",
        params.provider_name, API_TIMEOUT_SECS
    );
    let error_msg = format!("failed to call {} API", params.provider_name);

    let response: Box<dyn llm::chat::ChatResponse> = if llm_tools.is_empty() {
        timeout(api_timeout, llm.chat(&chat_messages))
            .await
            .context(timeout_msg)?
            .context(error_msg)?
    } else {
        timeout(
            api_timeout,
            llm.chat_with_tools(&chat_messages, Some(&llm_tools)),
        )
        .await
        .context(timeout_msg)?
        .context(error_msg)?
    };

    let tool_calls = parse_tool_calls(response.as_ref());

    let content = response.text().unwrap_or_else(|| {
        // empty content is normal for tool-use turns
        if tool_calls.is_empty() {
            warn!("{} API returned empty response text", params.provider_name);
        }
        String::new()
    });

    Ok(LlmResponse {
        message: Message::assistant(content),
        tool_calls,
    })
}

/// Convert our Message to the llm crate's ChatMessage format
fn convert_message(msg: &Message) -> ChatMessage {
    match msg.role {
        MessageRole::User => ChatMessage {
            role: ChatRole::User,
            message_type: MessageType::Text,
            content: msg.content.clone(),
        },
        MessageRole::Assistant if msg.tool_calls.is_empty() => ChatMessage {
            role: ChatRole::Assistant,
            message_type: MessageType::Text,
            content: msg.content.clone(),
        },
        MessageRole::Assistant => {
            let tool_calls: Vec<llm::ToolCall> = msg
                .tool_calls
                .iter()
                .map(|tc| llm::ToolCall {
                    id: tc.id.clone(),
                    call_type: "function".to_string(),
                    function: llm::FunctionCall {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect();
            ChatMessage {
                role: ChatRole::Assistant,
                message_type: MessageType::ToolUse(tool_calls),
                content: msg.content.clone(),
            }
        }
        MessageRole::Tool => {
            let (id, result) = msg
                .tool_result
                .as_ref()
                .map(|r| (r.tool_call_id.clone(), r.result.clone()))
                .unwrap_or_default();
            ChatMessage {
                role: ChatRole::User,
                message_type: MessageType::ToolResult(vec![llm::ToolCall {
                    id,
                    call_type: "function".to_string(),
                    function: llm::FunctionCall {
                        name: String::new(),
                        arguments: result,
                    },
                }]),
                content: String::new(),
            }
        }
    }
}

/// Anthropic LLM provider using the llm crate
pub struct AnthropicProvider {
    model: String,
    api_key: SecretString,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(model: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            model: model.into(),
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    fn chat_params<'a>(
        &'a self,
        system: &'a str,
        messages: &'a [Message],
        tools: &'a [&'a dyn Tool],
    ) -> ChatParams<'a> {
        ChatParams {
            backend: LLMBackend::Anthropic,
            provider_name: "Anthropic",
            api_key: self.api_key.expose_secret(),
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages,
            tools,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[&dyn Tool],
    ) -> Result<LlmResponse> {
        chat_impl(self.chat_params(system, messages, tools)).await
    }
}

/// OpenAI LLM provider using the llm crate
pub struct OpenAIProvider {
    model: String,
    api_key: SecretString,
    max_tokens: u32,
}

impl OpenAIProvider {
    pub fn new(model: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            model: model.into(),
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    fn chat_params<'a>(
        &'a self,
        system: &'a str,
        messages: &'a [Message],
        tools: &'a [&'a dyn Tool],
    ) -> ChatParams<'a> {
        ChatParams {
            backend: LLMBackend::OpenAI,
            provider_name: "OpenAI",
            api_key: self.api_key.expose_secret(),
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages,
            tools,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[&dyn Tool],
    ) -> Result<LlmResponse> {
        chat_impl(self.chat_params(system, messages, tools)).await
    }
}
