//! Tool trait — the interface every local capability implements.

use async_trait::async_trait;
use serde_json::{Map, Value};

use toolchat_core::types::ToolDefinition;

/// Decoded tool-call arguments.
pub type ToolArgs = Map<String, Value>;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The agent loop advertises tools via `to_definition()` and dispatches calls via
/// `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the LLM to call this tool (e.g. `"calculate"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Execute the tool with the decoded arguments.
    ///
    /// The schema is advisory; the model may still send the wrong shape, so
    /// implementations validate and return `Err` on bad input.
    async fn execute(&self, args: ToolArgs) -> anyhow::Result<Value>;

    /// Build the `ToolDefinition` sent to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(args: &ToolArgs, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_require_string_present() {
        let a = args(json!({"expression": "1+1"}));
        assert_eq!(require_string(&a, "expression").unwrap(), "1+1");
    }

    #[test]
    fn test_require_string_missing_or_wrong_type() {
        assert!(require_string(&args(json!({})), "expression").is_err());
        let err = require_string(&args(json!({"expression": 42})), "expression").unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: expression");
    }

    #[tokio::test]
    async fn test_to_definition_default() {
        struct DummyTool;

        #[async_trait]
        impl Tool for DummyTool {
            fn name(&self) -> &str {
                "dummy"
            }
            fn description(&self) -> &str {
                "A test tool"
            }
            fn parameters(&self) -> Value {
                json!({ "type": "object", "properties": {}, "required": [] })
            }
            async fn execute(&self, _args: ToolArgs) -> anyhow::Result<Value> {
                Ok(json!("ok"))
            }
        }

        let def = DummyTool.to_definition();
        assert_eq!(def.function.name, "dummy");
        assert_eq!(def.function.description, "A test tool");
        assert_eq!(def.tool_type, "function");
        assert_eq!(DummyTool.execute(ToolArgs::new()).await.unwrap(), json!("ok"));
    }
}
