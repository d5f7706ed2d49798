//! Per-call configuration carrier
//!
//! Callers pass a `RunConfig` to every `invoke`; the only recognised key is
//! `model`. Anything else rides along untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Call-time configuration handed to the supervisor and workers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Free-form configurable values
    #[serde(default)]
    pub configurable: HashMap<String, serde_json::Value>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the model for this call
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.configurable
            .insert("model".to_string(), serde_json::Value::String(model.into()));
        self
    }

    /// Model requested by the caller, if any
    pub fn model(&self) -> Option<&str> {
        self.configurable
            .get("model")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Model to use: the caller's choice, else the agent default
    pub fn resolve_model(&self, agent_default: &str) -> String {
        self.model().unwrap_or(agent_default).to_string()
    }
}
