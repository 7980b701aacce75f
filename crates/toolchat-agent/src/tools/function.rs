//! `FunctionTool` — wrap an async closure and a declaration into a [`Tool`].

use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use toolchat_core::types::ToolDefinition;

use super::base::{Tool, ToolArgs};

type Handler = Box<dyn Fn(ToolArgs) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// A tool whose declaration and handler are supplied separately.
///
/// ```
/// use serde_json::json;
/// use toolchat_agent::FunctionTool;
/// use toolchat_core::ToolDefinition;
///
/// let echo = FunctionTool::new(
///     ToolDefinition::new("echo", "Echo the input", json!({"type": "object"})),
///     |args| async move { Ok(json!(args)) },
/// );
/// ```
pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Handler,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            definition,
            handler: Box::new(move |args| handler(args).boxed()),
        }
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.definition.function.name)
            .finish()
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.definition.function.name
    }

    fn description(&self) -> &str {
        &self.definition.function.description
    }

    fn parameters(&self) -> Value {
        self.definition.function.parameters.clone()
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<Value> {
        (self.handler)(args).await
    }

    fn to_definition(&self) -> ToolDefinition {
        self.definition.clone()
    }
}
