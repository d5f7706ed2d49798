//! LLM client module
//!
//! Provides the model-call boundary used by the agents:
//! - `ChatModel`: one system prompt + history (+ tools) in, one reply out
//! - `ModelLoader`: turns a `provider/model-name` string into a `ChatModel`
//!
//! Supported providers: Anthropic (Messages API) and OpenAI (Chat Completions).

pub mod chat;
pub mod client;

pub use chat::{ChatMessage, ChatRequest, ChatTool, MessageRole, ToolCall, Usage};
pub use client::LlmClient;

use crate::config::{Config, Provider};
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// The model-call boundary
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the request and return the model's single reply message
    async fn generate(&self, request: &ChatRequest) -> Result<ChatMessage>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// Resolves model strings to chat models at call time
pub trait ModelLoader: Send + Sync {
    fn load(&self, model: &str) -> Result<Arc<dyn ChatModel>>;
}

/// A parsed `provider/model-name` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
}

impl ModelSpec {
    /// Split on the first `/` and validate the provider
    ///
    /// Never touches the network.
    pub fn parse(model_name: &str) -> Result<Self> {
        let (provider, model) = model_name
            .split_once('/')
            .ok_or_else(|| RouterError::InvalidConfig {
                message: format!(
                    "model '{}' must be in the form provider/model-name",
                    model_name
                ),
            })?;

        let provider = provider
            .parse::<Provider>()
            .map_err(|_| RouterError::UnsupportedProvider {
                provider: provider.to_string(),
            })?;

        if model.trim().is_empty() {
            return Err(RouterError::InvalidConfig {
                message: format!("model '{}' has an empty model name", model_name),
            });
        }

        Ok(ModelSpec {
            provider,
            model: model.to_string(),
        })
    }
}

impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// LLM Configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider type
    pub provider: Provider,
    /// API endpoint base URL
    pub base_url: String,
    /// Model identifier (without provider prefix)
    pub model: String,
    /// API key
    pub api_key: String,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: f32,
    /// HTTP transport timeout
    pub request_timeout: Duration,
}

impl LlmConfig {
    /// Build the client configuration for `spec` from the process config
    pub fn from_config(spec: &ModelSpec, config: &Config) -> Result<Self> {
        let endpoint = config.providers.get(spec.provider);
        let api_key = endpoint
            .api_key
            .clone()
            .ok_or_else(|| RouterError::MissingConfig {
                key: spec.provider.api_key_env().to_string(),
            })?;

        Ok(LlmConfig {
            provider: spec.provider,
            base_url: endpoint.base_url.clone(),
            model: spec.model.clone(),
            api_key,
            max_tokens: endpoint.max_tokens,
            temperature: config.temperature.clamp(0.0, 2.0),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }
}

/// Load a chat model from a `provider/model-name` string
///
/// Unsupported providers fail here, before any request is built.
pub fn load_chat_model(model_name: &str, config: &Config) -> Result<LlmClient> {
    let spec = ModelSpec::parse(model_name)?;
    let llm_config = LlmConfig::from_config(&spec, config)?;
    LlmClient::new(llm_config)
}

/// Default loader building HTTP clients from the process configuration
#[derive(Debug, Clone)]
pub struct ProviderLoader {
    config: Config,
}

impl ProviderLoader {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ModelLoader for ProviderLoader {
    fn load(&self, model: &str) -> Result<Arc<dyn ChatModel>> {
        Ok(Arc::new(load_chat_model(model, &self.config)?))
    }
}
