//! Worker agents
//!
//! A worker alternates between calling its model and running the tools the
//! model asked for, until the model answers without a tool request:
//!
//! ```text
//! CallModel --tool calls--> ExecuteTools --> CallModel ... --no tool calls--> done
//! ```

use super::prompts::{
    self, BOX_MAKER_PROMPT, REQUIRED_SCRIPT_DETAILS, RESEARCH_PROMPT, SCRIPT_MAKER_PROMPT,
};
use super::reply::{repair, StructuredReply};
use super::state::AgentState;
use super::tool::ToolRegistry;
use super::tools::{CalculateMaterialTool, SentimentTool, SummarizeTool, WebSearchTool};
use crate::config::{Config, RunConfig, ToolsConfig};
use crate::error::{Result, RouterError};
use crate::llm::{ChatMessage, ChatModel, ChatRequest, ModelLoader, ToolCall};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// The closed set of worker agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    ScriptMaker,
    BoxMaker,
    Research,
}

/// Where a worker goes after a model call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStep {
    ExecuteTools,
    Finish,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 3] = [WorkerKind::ScriptMaker, WorkerKind::BoxMaker, WorkerKind::Research];

    /// Canonical agent name
    pub fn name(&self) -> &'static str {
        match self {
            WorkerKind::ScriptMaker => "script_maker",
            WorkerKind::BoxMaker => "box_maker",
            WorkerKind::Research => "research",
        }
    }

    /// Look up a worker by canonical name or alias (`research_agent`, `box_creator_agent`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "script_maker" | "script_maker_agent" => Some(WorkerKind::ScriptMaker),
            "box_maker" | "box_maker_agent" | "box_creator_agent" => Some(WorkerKind::BoxMaker),
            "research" | "research_agent" => Some(WorkerKind::Research),
            _ => None,
        }
    }

    /// Key holding the worker's answer in its structured reply
    pub fn result_field(&self) -> &'static str {
        match self {
            WorkerKind::ScriptMaker => "final_script",
            WorkerKind::BoxMaker => "final_design",
            WorkerKind::Research => "final_report",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            WorkerKind::ScriptMaker => SCRIPT_MAKER_PROMPT,
            WorkerKind::BoxMaker => BOX_MAKER_PROMPT,
            WorkerKind::Research => RESEARCH_PROMPT,
        }
    }

    /// Build this worker's tool set
    pub fn tools(&self, config: &ToolsConfig) -> ToolRegistry {
        match self {
            WorkerKind::ScriptMaker => ToolRegistry::new().with_tool(Arc::new(SentimentTool::new(config))),
            WorkerKind::BoxMaker => ToolRegistry::new().with_tool(Arc::new(CalculateMaterialTool)),
            WorkerKind::Research => ToolRegistry::new()
                .with_tool(Arc::new(WebSearchTool::new(config)))
                .with_tool(Arc::new(SummarizeTool)),
        }
    }

    /// Turn a model reply into the message appended to the history
    ///
    /// Tool-call replies are kept as-is; final replies are repaired into
    /// this worker's structured form.
    pub fn produce_reply(&self, reply: ChatMessage) -> ChatMessage {
        if reply.has_tool_calls() {
            return reply;
        }
        let structured = repair(&reply.content, self.result_field());
        ChatMessage::assistant(structured.to_json()).with_name(self.name())
    }

    /// Decide the next step from the last message
    pub fn route(&self, state: &AgentState) -> WorkerStep {
        match state.last() {
            Some(last) if last.has_tool_calls() => WorkerStep::ExecuteTools,
            _ => WorkerStep::Finish,
        }
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Loop limits and defaults shared by all workers
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerSettings {
    /// Model used when the call does not name one
    pub default_model: String,
    /// Maximum model calls per invocation
    pub recursion_limit: usize,
    pub model_timeout: Option<Duration>,
    pub tool_timeout: Option<Duration>,
    /// Script maker only: ask for details before calling the model
    pub require_script_details: bool,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_model: config.model.clone(),
            recursion_limit: config.recursion_limit.max(1),
            model_timeout: config.model_timeout_secs.map(Duration::from_secs),
            tool_timeout: config.tool_timeout_secs.map(Duration::from_secs),
            require_script_details: config.require_script_details,
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A worker agent: one kind, its tools, and a way to load its model
pub struct WorkerAgent {
    kind: WorkerKind,
    tools: ToolRegistry,
    loader: Arc<dyn ModelLoader>,
    settings: WorkerSettings,
}

impl WorkerAgent {
    /// Build a worker with its standard tool set
    pub fn new(kind: WorkerKind, config: &Config, loader: Arc<dyn ModelLoader>) -> Self {
        Self::with_tools(kind, kind.tools(&config.tools), loader, WorkerSettings::from_config(config))
    }

    /// Build a worker with an explicit tool set
    pub fn with_tools(
        kind: WorkerKind,
        tools: ToolRegistry,
        loader: Arc<dyn ModelLoader>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            kind,
            tools,
            loader,
            settings,
        }
    }

    pub fn kind(&self) -> WorkerKind {
        self.kind
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the worker loop on `messages`
    ///
    /// The returned history ends with a message without tool requests.
    pub async fn invoke(&self, messages: Vec<ChatMessage>, run: &RunConfig) -> Result<AgentState> {
        let mut state = AgentState::new(messages);

        if let Some(reply) = self.check_script_details(&state) {
            tracing::info!(agent = %self.kind, "required details missing, asking the user");
            state.push(reply);
            return Ok(state);
        }

        let model_name = run.resolve_model(&self.settings.default_model);
        let model = self.loader.load(&model_name)?;
        tracing::debug!(agent = %self.kind, model = %model_name, "worker started");

        let mut steps = 0;
        loop {
            if steps >= self.settings.recursion_limit {
                return Err(RouterError::StepLimit {
                    agent: self.kind.name().to_string(),
                    limit: self.settings.recursion_limit,
                });
            }
            steps += 1;

            let reply = self.call_model(model.as_ref(), &state).await?;
            state.push(self.kind.produce_reply(reply));

            match self.kind.route(&state) {
                WorkerStep::ExecuteTools => self.execute_tools(&mut state).await,
                WorkerStep::Finish => {
                    tracing::debug!(agent = %self.kind, steps, "worker finished");
                    return Ok(state);
                }
            }
        }
    }

    async fn call_model(&self, model: &dyn ChatModel, state: &AgentState) -> Result<ChatMessage> {
        let request = ChatRequest::new(state.messages.clone())
            .with_system_prompt(prompts::render(self.kind.system_prompt(), Utc::now()))
            .with_tools(self.tools.schemas());

        tracing::debug!(agent = %self.kind, model = model.model_name(), history = state.messages.len(), "calling model");
        with_timeout(self.settings.model_timeout, "model call", model.generate(&request)).await
    }

    /// Run every tool call of the last message, in order
    ///
    /// Each request yields exactly one tool message; failures become error
    /// messages and never abort the loop.
    pub async fn execute_tools(&self, state: &mut AgentState) {
        let calls: Vec<ToolCall> = match state.last() {
            Some(last) if last.has_tool_calls() => last.tool_calls.clone(),
            _ => return,
        };

        for call in calls {
            let content = match self.run_tool(&call).await {
                Ok(result) => format!("Tool {} returned: {}", call.name, result),
                Err(e) => {
                    tracing::warn!(agent = %self.kind, tool = %call.name, "tool failed: {}", e);
                    format!("Error executing tool {}: {}", call.name, tool_error_text(&e))
                }
            };
            state.push(ChatMessage::tool(call.id, call.name, content));
        }
    }

    async fn run_tool(&self, call: &ToolCall) -> Result<Value> {
        tracing::debug!(agent = %self.kind, tool = %call.name, "executing tool");
        let operation = format!("tool {}", call.name);
        with_timeout(
            self.settings.tool_timeout,
            &operation,
            self.tools.call(&call.name, call.arguments.clone()),
        )
        .await
    }

    fn check_script_details(&self, state: &AgentState) -> Option<ChatMessage> {
        if self.kind != WorkerKind::ScriptMaker || !self.settings.require_script_details {
            return None;
        }

        let request = state
            .last_user_message()
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();
        let missing: Vec<&str> = REQUIRED_SCRIPT_DETAILS
            .iter()
            .copied()
            .filter(|detail| !request.contains(detail))
            .collect();

        // Only block when nothing at all was provided
        if missing.len() < REQUIRED_SCRIPT_DETAILS.len() {
            return None;
        }

        let reply = StructuredReply::new(
            self.kind.result_field(),
            "User has not provided any required details. Requesting more information.",
            prompts::missing_details_request(&missing),
        );
        Some(ChatMessage::assistant(reply.to_json()).with_name(self.kind.name()))
    }
}

/// Await `future`, bounded by `limit` when set
pub(crate) async fn with_timeout<T, F>(limit: Option<Duration>, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(duration) => tokio::time::timeout(duration, future)
            .await
            .map_err(|_| RouterError::Timeout {
                operation: operation.to_string(),
                duration,
            })?,
        None => future.await,
    }
}

/// Error text shown to the model
fn tool_error_text(error: &RouterError) -> String {
    match error {
        RouterError::ToolNotFound { .. } => "tool not found".to_string(),
        RouterError::ToolExecutionFailed { error, .. } => error.clone(),
        other => other.to_string(),
    }
}
