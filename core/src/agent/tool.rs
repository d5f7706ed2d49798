use crate::error::{Result, RouterError};
use crate::llm::ChatTool;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A trait for tools that can be requested by a worker's model.
///
/// Tools take a JSON object of arguments and return a JSON result.
/// They share no state with each other and must be `Send + Sync` to be
/// used in the worker loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The name of the tool (e.g., "calculate_material")
    fn name(&self) -> &str;

    /// A brief description of what the tool does
    fn description(&self) -> &str;

    /// JSON schema for the arguments object
    fn parameters(&self) -> Value;

    /// Execute the tool with the provided arguments
    async fn call(&self, args: Value) -> Result<Value>;

    /// Schema advertised to the model
    fn schema(&self) -> ChatTool {
        ChatTool {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Fixed set of tools owned by one worker, looked up by exact name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a new, empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    /// Builder-style `register`
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Get a tool by exact name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Look up and run a tool
    pub async fn call(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self.get(name).ok_or_else(|| RouterError::ToolNotFound {
            tool_name: name.to_string(),
        })?;
        tool.call(args).await
    }

    /// Tool names in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Schemas in registration order
    pub fn schemas(&self) -> Vec<ChatTool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.schema())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.order).finish()
    }
}

/// Deserialize a tool's arguments object into its typed parameters
pub fn parse_args<T: serde::de::DeserializeOwned>(tool_name: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| RouterError::InvalidToolArguments {
        tool_name: tool_name.to_string(),
        reason: e.to_string(),
    })
}
