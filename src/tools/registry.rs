use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use super::Tool;
use crate::llm::ToolCall;

/// Tool output handed back to the model when a tool has nothing usable to report
pub const NO_RESULT: &str = "null";

/// What the registry does when a tool's `execute` fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the agent run with the tool's error
    #[default]
    Propagate,
    /// Log the error and give the model the [`NO_RESULT`] sentinel instead
    Trap,
}

struct Registered {
    tool: Arc<dyn Tool>,
    policy: ErrorPolicy,
}

/// Registry for tools
pub struct ToolRegistry {
    tools: HashMap<String, Registered>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool with the error policy applied to its failures
    pub fn register(&mut self, tool: impl Tool + 'static, policy: ErrorPolicy) {
        let name = tool.name().to_string();
        self.tools.insert(
            name,
            Registered {
                tool: Arc::new(tool),
                policy,
            },
        );
    }

    /// Get all tools
    pub fn all(&self) -> Vec<&dyn Tool> {
        self.tools.values().map(|r| r.tool.as_ref()).collect()
    }

    /// Run a model-requested tool call under that tool's error policy.
    ///
    /// Unknown tools are reported back to the model as text rather than failing the run.
    pub async fn execute(&self, call: &ToolCall) -> Result<String> {
        let Some(registered) = self.tools.get(&call.name) else {
            return Ok(format!("Error: unknown tool '{}'", call.name));
        };

        match registered.tool.execute(call.arguments.clone()).await {
            Ok(output) => Ok(output),
            Err(e) => match registered.policy {
                ErrorPolicy::Propagate => {
                    Err(e.context(format!("tool '{}' failed", call.name)))
                }
                ErrorPolicy::Trap => {
                    warn!(tool = %call.name, error = %e, "tool failed, returning no result");
                    Ok(NO_RESULT.to_string())
                }
            },
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _params: Value) -> Result<String> {
            anyhow::bail!("provider unavailable")
        }
    }

    fn call(name: &str) -> ToolCall {
        ToolCall::new("call_1", name, json!({}))
    }

    #[tokio::test]
    async fn trap_policy_returns_sentinel() {
        let mut registry = ToolRegistry::new();
        registry.register(Failing, ErrorPolicy::Trap);

        assert_eq!(registry.execute(&call("failing")).await.unwrap(), NO_RESULT);
    }

    #[tokio::test]
    async fn propagate_policy_returns_error() {
        let mut registry = ToolRegistry::new();
        registry.register(Failing, ErrorPolicy::Propagate);

        let err = registry.execute(&call("failing")).await.unwrap_err();
        assert!(format!("{:#}", err).contains("provider unavailable"));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_the_model() {
        let registry = ToolRegistry::new();
        let output = registry.execute(&call("book_flight")).await.unwrap();
        assert_eq!(output, "Error: unknown tool 'book_flight'");
    }

    #[tokio::test]
    async fn reregistering_replaces_the_policy() {
        let mut registry = ToolRegistry::default();
        registry.register(Failing, ErrorPolicy::Propagate);
        registry.register(Failing, ErrorPolicy::Trap);

        assert_eq!(registry.all().len(), 1);
        assert_eq!(registry.execute(&call("failing")).await.unwrap(), NO_RESULT);
    }
}
