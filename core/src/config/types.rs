use serde::{Deserialize, Serialize};

/// LLM provider families reachable through a `provider/model-name` string
///
/// The provider prefix is matched case-insensitively.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Anthropic Messages API
    ///
    /// Default URL: https://api.anthropic.com/v1
    /// Env var: ANTHROPIC_API_KEY
    Anthropic,

    /// OpenAI Chat Completions API
    ///
    /// Default URL: https://api.openai.com/v1
    /// Env var: OPENAI_API_KEY
    Openai,
}

impl Provider {
    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Openai => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::Openai),
            _ => Err(format!("Unsupported model provider: {}", s)),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Openai => write!(f, "openai"),
        }
    }
}

/// How the supervisor turns its model reply into a routing decision
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Substring match of fixed keyword sets against the lowercased reply
    #[default]
    Keyword,
    /// JSON reply with a `next` field naming a worker or `FINISH`
    Structured,
}

impl std::str::FromStr for RoutingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(RoutingStrategy::Keyword),
            "structured" | "json" => Ok(RoutingStrategy::Structured),
            _ => Err(format!("Unknown routing strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingStrategy::Keyword => write!(f, "keyword"),
            RoutingStrategy::Structured => write!(f, "structured"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error occurred while reading/writing config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
