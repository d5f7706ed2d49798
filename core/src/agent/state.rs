//! Conversation state for workers and the supervisor
//!
//! History only ever grows: messages are appended, never edited or removed.

use super::routing::RoutingDecision;
use super::worker::WorkerKind;
use crate::llm::{ChatMessage, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// State of one worker invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub messages: Vec<ChatMessage>,
}

impl AgentState {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Append a message
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Most recent user message
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        last_user_message(&self.messages)
    }
}

/// Per-run bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Correlates the log lines of one run
    pub trace_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Raw text of the supervisor's routing reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<RoutingDecision>,
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            started_at: Utc::now(),
            routing_reply: None,
            decision: None,
        }
    }
}

/// Structured output produced by a dispatched worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub agent: WorkerKind,
    /// `{"chain_of_thought": ..., "<result field>": ...}`
    pub reply: Value,
}

/// State of one supervisor invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorState {
    pub messages: Vec<ChatMessage>,
    /// Worker last dispatched to
    #[serde(default)]
    pub current_agent: Option<WorkerKind>,
    /// Every worker dispatched to so far, duplicates allowed
    #[serde(default)]
    pub completed_agents: Vec<WorkerKind>,
    #[serde(default)]
    pub metadata: RunMetadata,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// Set by the caller to forbid any further dispatch
    #[serde(default)]
    pub is_last_step: bool,
}

impl SupervisorState {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            current_agent: None,
            completed_agents: Vec::new(),
            metadata: RunMetadata::default(),
            artifacts: Vec::new(),
            is_last_step: false,
        }
    }

    pub fn with_last_step(mut self, is_last_step: bool) -> Self {
        self.is_last_step = is_last_step;
        self
    }

    pub fn with_completed_agents(mut self, completed: Vec<WorkerKind>) -> Self {
        self.completed_agents = completed;
        self
    }

    /// Most recent user message
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        last_user_message(&self.messages)
    }

    /// Final message of the run
    pub fn final_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Record a finished dispatch
    pub(crate) fn record_dispatch(&mut self, agent: WorkerKind, reply: ChatMessage, artifact: Value) {
        self.messages.push(reply);
        self.current_agent = Some(agent);
        self.completed_agents.push(agent);
        self.artifacts.push(Artifact {
            agent,
            reply: artifact,
        });
    }
}

fn last_user_message(messages: &[ChatMessage]) -> Option<&ChatMessage> {
    messages.iter().rev().find(|m| m.role == MessageRole::User)
}
