//! Structured error types for switchboard
//!
//! Configuration and provider failures are fatal and reach the caller.
//! Tool failures are contained by the worker loop and only surface as
//! tool-result messages; routing failures are never raised at all.

use std::time::Duration;
use thiserror::Error;

/// Primary error type for switchboard operations
#[derive(Error, Debug)]
pub enum RouterError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Model string names a provider we cannot talk to
    #[error("unsupported model provider: {provider}")]
    UnsupportedProvider { provider: String },

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Missing required config (usually an API key)
    #[error("missing required configuration: {key}")]
    MissingConfig { key: String },

    // =========================================================================
    // Provider / API Errors
    // =========================================================================
    /// Provider returned a non-success status
    #[error("provider error: {status} - {message}")]
    Provider { status: u16, message: String },

    /// Provider answered with something we could not decode
    #[error("malformed provider response: {message}")]
    MalformedResponse { message: String },

    // =========================================================================
    // Tool Execution Errors
    // =========================================================================
    /// Tool not registered on the worker
    #[error("tool not found: {tool_name}")]
    ToolNotFound { tool_name: String },

    /// Tool execution failed
    #[error("tool execution failed: {tool_name} - {error}")]
    ToolExecutionFailed { tool_name: String, error: String },

    /// Invalid tool arguments
    #[error("invalid tool arguments for {tool_name}: {reason}")]
    InvalidToolArguments { tool_name: String, reason: String },

    // =========================================================================
    // Execution Errors
    // =========================================================================
    /// Suspension point exceeded its configured timeout
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Worker loop exceeded the recursion limit
    #[error("agent {agent} exceeded the recursion limit of {limit} steps")]
    StepLimit { agent: String, limit: usize },

    // =========================================================================
    // External Error Wrappers
    // =========================================================================
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RouterError {
    /// Configuration errors are raised before any network call is attempted
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProvider { .. } | Self::InvalidConfig { .. } | Self::MissingConfig { .. }
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedProvider { provider } => format!(
                "Provider '{}' is not supported. Use 'anthropic/<model>' or 'openai/<model>'.",
                provider
            ),
            Self::MissingConfig { key } => {
                format!("'{}' is not set. Add it to the config file or the environment.", key)
            }
            Self::Provider { status: 401, .. } => {
                "Authentication failed. Please check your API key.".to_string()
            }
            Self::StepLimit { agent, .. } => {
                format!("The {} agent did not finish within its step budget.", agent)
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias using RouterError
pub type Result<T> = std::result::Result<T, RouterError>;
