use anyhow::{Context, Result};
use tokio::time::{Duration, sleep};
use tracing::{debug, info};

use crate::llm::{LlmProvider, Message};
use crate::tools::ToolRegistry;

/// Shared agent execution loop.
///
/// Iterates with the LLM, executing requested tool calls and feeding their results back,
/// until the LLM answers without requesting tools. That final text is returned.
///
/// - `agent_name`: For logging (e.g., "flight", "hotel")
/// - `system_prompt`: The system prompt for this agent
/// - `messages`: Initial messages (typically a single user message)
/// - `provider`: LLM provider to use
/// - `tools`: Tools offered to the model, each with its error policy
/// - `max_iterations`: Maximum number of LLM round-trips before bailing
pub async fn agent_loop(
    agent_name: &str,
    system_prompt: &str,
    mut messages: Vec<Message>,
    provider: &dyn LlmProvider,
    tools: &ToolRegistry,
    max_iterations: usize,
) -> Result<String> {
    let tool_refs = tools.all();

    for iteration in 0..max_iterations {
        debug!(agent = agent_name, provider = provider.name(), iteration, "agent iteration");

        // Rate limiting to avoid hammering the API
        if iteration > 0 {
            sleep(Duration::from_millis(100)).await;
        }

        let response = provider
            .chat(system_prompt, &messages, &tool_refs)
            .await
            .with_context(|| format!("{} agent: {} chat failed", agent_name, provider.name()))?;

        debug!(agent = agent_name, content = %response.message.content, "llm response");

        let tool_calls = response.tool_calls;
        if tool_calls.is_empty() {
            info!(agent = agent_name, "agent completed (no more tool calls)");
            return Ok(response.message.content);
        }

        let mut tool_results = Vec::with_capacity(tool_calls.len());
        for tool_call in &tool_calls {
            debug!(agent = agent_name, tool = %tool_call.name, "executing tool");

            let result = tools
                .execute(tool_call)
                .await
                .with_context(|| format!("{} agent: tool call failed", agent_name))?;

            debug!(agent = agent_name, tool = %tool_call.name, result = %result, "tool result");
            tool_results.push((tool_call.id.clone(), result));
        }

        messages.push(Message::assistant_with_tools(
            &response.message.content,
            tool_calls,
        ));
        for (id, result) in tool_results {
            messages.push(Message::tool_result(&id, result));
        }
    }

    anyhow::bail!(
        "{} agent exceeded maximum iterations ({})",
        agent_name,
        max_iterations
    );
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::llm::{LlmResponse, MessageRole, ToolCall};
    use crate::tools::{ErrorPolicy, Tool};

    /// Replays scripted responses and records the conversation it was shown
    struct Scripted {
        responses: Mutex<VecDeque<LlmResponse>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl Scripted {
        fn new(responses: Vec<LlmResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(
            &self,
            _system: &str,
            messages: &[Message],
            _tools: &[&dyn Tool],
        ) -> Result<LlmResponse> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .context("no scripted responses left")
        }
    }

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes its input"
        }

        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        async fn execute(&self, params: Value) -> Result<String> {
            Ok(params["text"].as_str().unwrap_or_default().to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl Tool for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _params: Value) -> Result<String> {
            anyhow::bail!("boom")
        }
    }

    fn registry() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.register(Echo, ErrorPolicy::Propagate);
        tools.register(Broken, ErrorPolicy::Propagate);
        tools
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let provider = Scripted::new(vec![
            LlmResponse::tool_calls(vec![ToolCall::new("c1", "echo", json!({"text": "hi"}))]),
            LlmResponse::text("done"),
        ]);

        let answer = agent_loop("test", "sys", vec![Message::user("go")], &provider, &registry(), 5)
            .await
            .unwrap();

        assert_eq!(answer, "done");
        let seen = provider.seen.lock().unwrap();
        let second_turn = &seen[1];
        assert_eq!(second_turn.len(), 3);
        assert_eq!(second_turn[1].tool_calls[0].name, "echo");
        assert_eq!(second_turn[2].role, MessageRole::Tool);
        assert_eq!(second_turn[2].tool_result.as_ref().unwrap().result, "hi");
    }

    #[tokio::test]
    async fn propagated_tool_error_stops_the_loop() {
        let provider = Scripted::new(vec![LlmResponse::tool_calls(vec![ToolCall::new(
            "c1",
            "broken",
            json!({}),
        )])]);

        let err = agent_loop("test", "sys", vec![Message::user("go")], &provider, &registry(), 5)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("boom"));
    }

    #[tokio::test]
    async fn chat_failure_names_the_provider() {
        let provider = Scripted::new(Vec::new());

        let err = agent_loop("test", "sys", vec![Message::user("go")], &provider, &registry(), 5)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("test agent: scripted chat failed"));
    }

    #[tokio::test]
    async fn iteration_limit_is_enforced() {
        let looping = (0..3)
            .map(|i| LlmResponse::tool_calls(vec![ToolCall::new(format!("c{}", i), "echo", json!({}))]))
            .collect();
        let provider = Scripted::new(looping);

        let err = agent_loop("test", "sys", vec![Message::user("go")], &provider, &registry(), 2)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exceeded maximum iterations (2)"));
    }
}
