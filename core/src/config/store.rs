//! Configuration Store
//!
//! Loads the TOML config file and layers environment overrides on top.

use super::types::{ConfigError, Provider, RoutingStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default model for the supervisor and every worker
pub const DEFAULT_MODEL: &str = "anthropic/claude-3-5-sonnet-20240620";

/// Unified switchboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model in `provider/model-name` form
    #[serde(default = "default_model")]
    pub model: String,

    /// Routing strategy used by the supervisor
    #[serde(default)]
    pub routing: RoutingStrategy,

    /// Maximum model calls per worker invocation
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: usize,

    /// Timeout around each model call (unset = wait indefinitely)
    #[serde(default)]
    pub model_timeout_secs: Option<u64>,

    /// Timeout around each tool call (unset = wait indefinitely)
    #[serde(default)]
    pub tool_timeout_secs: Option<u64>,

    /// HTTP transport timeout for provider requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Ask for script details before calling the model when none are given
    #[serde(default)]
    pub require_script_details: bool,

    /// LLM provider endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            routing: RoutingStrategy::default(),
            recursion_limit: default_recursion_limit(),
            model_timeout_secs: None,
            tool_timeout_secs: None,
            request_timeout_secs: default_request_timeout(),
            temperature: 0.0,
            require_script_details: false,
            providers: ProvidersConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the effective configuration
    ///
    /// An explicit path must load. Otherwise the standard locations are
    /// tried and defaults are used when no file exists. Environment
    /// overrides are applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match super::find_config_file() {
                Some(path) => Self::load(path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        super::get_config_dir().map(|d| d.join("config.toml"))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Invalid values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("SWITCHBOARD_MODEL").filter(|m| !m.trim().is_empty()) {
            self.model = model.trim().to_string();
        }

        if let Some(routing) = lookup("SWITCHBOARD_ROUTING") {
            match routing.parse::<RoutingStrategy>() {
                Ok(strategy) => self.routing = strategy,
                Err(e) => tracing::warn!("Ignoring SWITCHBOARD_ROUTING: {}", e),
            }
        }

        if let Some(limit) = lookup("SWITCHBOARD_RECURSION_LIMIT") {
            match limit.parse::<usize>() {
                Ok(n) if n > 0 => self.recursion_limit = n,
                _ => tracing::warn!("Ignoring SWITCHBOARD_RECURSION_LIMIT={:?}: expected a positive integer", limit),
            }
        }

        for provider in [Provider::Anthropic, Provider::Openai] {
            let endpoint = self.providers.get_mut(provider);
            if endpoint.api_key.is_none() {
                endpoint.api_key = lookup(provider.api_key_env()).filter(|k| !k.trim().is_empty());
            }
        }

        if self.tools.tavily_api_key.is_none() {
            self.tools.tavily_api_key = lookup("TAVILY_API_KEY").filter(|k| !k.trim().is_empty());
        }
        if self.tools.hf_api_token.is_none() {
            self.tools.hf_api_token = lookup("HF_API_TOKEN").filter(|k| !k.trim().is_empty());
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_recursion_limit() -> usize {
    25
}

fn default_request_timeout() -> u64 {
    300
}

/// Endpoints for both supported providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "ProviderConfig::anthropic")]
    pub anthropic: ProviderConfig,
    #[serde(default = "ProviderConfig::openai")]
    pub openai: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            anthropic: ProviderConfig::anthropic(),
            openai: ProviderConfig::openai(),
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::Anthropic => &self.anthropic,
            Provider::Openai => &self.openai,
        }
    }

    pub fn get_mut(&mut self, provider: Provider) -> &mut ProviderConfig {
        match provider {
            Provider::Anthropic => &mut self.anthropic,
            Provider::Openai => &mut self.openai,
        }
    }
}

/// Provider (LLM) endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API base URL
    pub base_url: String,

    /// API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Maximum tokens in a reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderConfig {
    pub fn anthropic() -> Self {
        Self {
            base_url: "https://api.anthropic.com/v1".to_string(),
            api_key: None,
            max_tokens: default_max_tokens(),
        }
    }

    pub fn openai() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_tokens() -> u32 {
    4096
}

/// Tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Maximum results returned by `search`
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Tavily search endpoint
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    /// Tavily API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tavily_api_key: Option<String>,

    /// Hugging Face inference endpoint
    #[serde(default = "default_inference_base_url")]
    pub inference_base_url: String,

    /// Hugging Face API token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_api_token: Option<String>,

    /// Model used by `sentiment_analysis`
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_search_results: default_max_search_results(),
            search_base_url: default_search_base_url(),
            tavily_api_key: None,
            inference_base_url: default_inference_base_url(),
            hf_api_token: None,
            sentiment_model: default_sentiment_model(),
        }
    }
}

fn default_max_search_results() -> usize {
    5
}

fn default_search_base_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_inference_base_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_sentiment_model() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}
