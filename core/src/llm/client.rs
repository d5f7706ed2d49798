//! LLM Client implementation
//!
//! Supports two providers:
//! - Anthropic Messages API
//! - OpenAI Chat Completions API (and compatible endpoints)

use super::{
    chat::{ChatMessage, ChatRequest, ChatTool, MessageRole, ToolCall, Usage},
    ChatModel, LlmConfig,
};
use crate::config::Provider;
use crate::error::{Result, RouterError};
use crate::util::{sanitize_base_url, validate_api_key};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client as HttpClient,
};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Main LLM Client
pub struct LlmClient {
    config: LlmConfig,
    base_url: String,
    headers: HeaderMap,
    http_client: HttpClient,
}

// Headers carry the API key, so only the endpoint identity is printed
impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("provider", &self.config.provider)
            .field("model", &self.config.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Create a new LLM client
    ///
    /// Validates the endpoint and key up front so a bad configuration never
    /// reaches the network.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let base_url = sanitize_base_url(&config.base_url, "Base URL")?;
        let headers = build_headers(&config)?;
        let http_client = HttpClient::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("switchboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(LlmClient {
            config,
            base_url,
            headers,
            http_client,
        })
    }

    /// Get the provider type
    pub fn provider(&self) -> Provider {
        self.config.provider
    }

    /// Get the configuration
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send a chat request and get the reply
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage> {
        tracing::debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "chat request"
        );

        let started = std::time::Instant::now();
        let result = match self.config.provider {
            Provider::Anthropic => self.chat_anthropic(request).await,
            Provider::Openai => self.chat_openai(request).await,
        };

        match &result {
            Ok((message, usage)) => tracing::debug!(
                model = %self.config.model,
                elapsed = ?started.elapsed(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                tool_calls = message.tool_calls.len(),
                "chat completed"
            ),
            Err(e) => tracing::warn!(
                model = %self.config.model,
                elapsed = ?started.elapsed(),
                "chat failed: {}", e
            ),
        }

        result.map(|(message, _)| message)
    }

    /// Anthropic Messages API chat
    async fn chat_anthropic(&self, request: &ChatRequest) -> Result<(ChatMessage, Usage)> {
        let url = format!("{}/messages", self.base_url);

        let mut system = request.system.clone();
        let mut messages: Vec<AnthropicMessage> = Vec::new();
        for m in &request.messages {
            if m.role == MessageRole::System {
                if !system.is_empty() {
                    system.push_str("\n\n");
                }
                system.push_str(&m.content);
                continue;
            }

            let (role, blocks) = anthropic_blocks(m);
            if blocks.is_empty() {
                continue;
            }

            // The API requires alternating roles; merge runs (e.g. several tool results)
            if let Some(last) = messages.last_mut() {
                if last.role == role {
                    last.content.extend(blocks);
                    continue;
                }
            }
            messages.push(AnthropicMessage {
                role: role.to_string(),
                content: blocks,
            });
        }

        let body = AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: (!system.is_empty()).then_some(system),
            messages,
            tools: request.tools.iter().map(AnthropicTool::from).collect(),
        };

        let response = self
            .http_client
            .post(&url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        let response_body: AnthropicResponse = read_json(response).await?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in response_body.content {
            match block {
                AnthropicBlock::Text { text: t } => text.push_str(&t),
                AnthropicBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall::new(id, name, input))
                }
                AnthropicBlock::ToolResult { .. } | AnthropicBlock::Other => {}
            }
        }

        let usage = response_body
            .usage
            .map(|u| Usage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            })
            .unwrap_or_default();

        Ok((ChatMessage::assistant_with_tools(text, tool_calls), usage))
    }

    /// OpenAI-compatible API chat
    async fn chat_openai(&self, request: &ChatRequest) -> Result<(ChatMessage, Usage)> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(OpenAiMessage {
                role: MessageRole::System.to_string(),
                content: Some(request.system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        messages.extend(request.messages.iter().map(OpenAiMessage::from));

        let body = OpenAiRequest {
            model: &self.config.model,
            messages,
            max_completion_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools: (!request.tools.is_empty())
                .then(|| request.tools.iter().map(OpenAiTool::from).collect()),
        };

        let response = self
            .http_client
            .post(&url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        let response_body: OpenAiResponse = read_json(response).await?;
        let choice = response_body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RouterError::MalformedResponse {
                message: "OpenAI returned no choices".to_string(),
            })?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                // Keep undecodable arguments as a raw string; the tool rejects them later
                let arguments = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments));
                ToolCall::new(tc.id, tc.function.name, arguments)
            })
            .collect();

        let usage = response_body
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok((
            ChatMessage::assistant_with_tools(choice.message.content.unwrap_or_default(), tool_calls),
            usage,
        ))
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn generate(&self, request: &ChatRequest) -> Result<ChatMessage> {
        self.chat(request).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Build headers for API requests
fn build_headers(config: &LlmConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let key = validate_api_key(&config.api_key, config.provider.api_key_env())?;
    let invalid = |_| RouterError::InvalidConfig {
        message: format!("{} is not a valid HTTP header value", config.provider.api_key_env()),
    };

    match config.provider {
        Provider::Anthropic => {
            headers.insert("x-api-key", HeaderValue::from_str(&key).map_err(invalid)?);
            headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        }
        Provider::Openai => {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key)).map_err(invalid)?,
            );
        }
    }

    Ok(headers)
}

/// Decode a success body, or turn an error status into `RouterError::Provider`
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(RouterError::Provider {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|e| RouterError::MalformedResponse {
        message: format!("{}: {}", e, text.chars().take(200).collect::<String>()),
    })
}

/// Map one chat message onto an Anthropic role and its content blocks
fn anthropic_blocks(message: &ChatMessage) -> (&'static str, Vec<AnthropicBlock>) {
    match message.role {
        MessageRole::Tool => (
            "user",
            vec![AnthropicBlock::ToolResult {
                tool_use_id: message.tool_call_id.clone().unwrap_or_default(),
                content: message.content.clone(),
            }],
        ),
        MessageRole::Assistant => {
            let mut blocks = Vec::new();
            if !message.content.trim().is_empty() {
                blocks.push(AnthropicBlock::Text {
                    text: message.content.clone(),
                });
            }
            blocks.extend(message.tool_calls.iter().map(|tc| AnthropicBlock::ToolUse {
                id: tc.id.clone(),
                name: tc.name.clone(),
                input: tc.arguments.clone(),
            }));
            ("assistant", blocks)
        }
        MessageRole::User | MessageRole::System => {
            if message.content.trim().is_empty() {
                ("user", Vec::new())
            } else {
                (
                    "user",
                    vec![AnthropicBlock::Text {
                        text: message.content.clone(),
                    }],
                )
            }
        }
    }
}

// Anthropic API types
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<AnthropicBlock>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

impl From<&ChatTool> for AnthropicTool {
    fn from(tool: &ChatTool) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.parameters.clone(),
        }
    }
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

// OpenAI-compatible API types
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    max_completion_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
}

#[derive(Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(m: &ChatMessage) -> Self {
        let tool_calls = (!m.tool_calls.is_empty()).then(|| {
            m.tool_calls
                .iter()
                .map(|tc| OpenAiToolCall {
                    id: tc.id.clone(),
                    type_: "function".to_string(),
                    function: OpenAiToolFunction {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect()
        });

        Self {
            role: m.role.to_string(),
            content: Some(m.content.clone()),
            tool_calls,
            tool_call_id: m.tool_call_id.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    type_: String,
    function: OpenAiToolFunction,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Serialize, Deserialize)]
struct OpenAiToolFunction {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    type_: &'static str,
    function: OpenAiFunction,
}

#[derive(Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl From<&ChatTool> for OpenAiTool {
    fn from(tool: &ChatTool) -> Self {
        Self {
            type_: "function",
            function: OpenAiFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        }
    }
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
