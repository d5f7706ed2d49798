use crate::agent::tool::{parse_args, Tool};
use crate::config::ToolsConfig;
use crate::error::{Result, RouterError};
use crate::util::{sanitize_base_url, validate_api_key};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

/// One web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// A tool for searching the web through the Tavily search API
pub struct WebSearchTool {
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(config: &ToolsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("switchboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: config.search_base_url.clone(),
            api_key: config.tavily_api_key.clone(),
            max_results: config.max_search_results,
            client,
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        // Checked per call so a worker without a key still builds
        let api_key = validate_api_key(self.api_key.as_deref().unwrap_or_default(), "TAVILY_API_KEY")?;
        let url = format!("{}/search", sanitize_base_url(&self.base_url, "search_base_url")?);

        tracing::debug!(query, max_results = self.max_results, "tavily search");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "api_key": api_key,
                "query": query,
                "max_results": self.max_results,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RouterError::ToolExecutionFailed {
                tool_name: self.name().to_string(),
                error: format!("search API returned {}: {}", status, text.trim()),
            });
        }

        let body: TavilyResponse = response.json().await?;
        Ok(body.results.into_iter().take(self.max_results).collect())
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search for general web results. Useful for current events, facts and general information."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "The search query"}
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: SearchArgs = parse_args(self.name(), args)?;
        let results = self.search(&args.query).await?;
        Ok(serde_json::to_value(results)?)
    }
}
