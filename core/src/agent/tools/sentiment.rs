use crate::agent::tool::{parse_args, Tool};
use crate::config::ToolsConfig;
use crate::error::{Result, RouterError};
use crate::util::{sanitize_base_url, validate_api_key};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SentimentArgs {
    text: String,
}

/// One classifier label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: String,
    pub score: f64,
}

/// The inference API answers `[[{label, score}, ...]]` for a single input;
/// some deployments drop the outer list.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<SentimentScore>>),
    Flat(Vec<SentimentScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<SentimentScore> {
        match self {
            Self::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            Self::Flat(scores) => scores,
        }
    }
}

/// A tool classifying the emotional tone of a text via the Hugging Face inference API
pub struct SentimentTool {
    base_url: String,
    model: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl SentimentTool {
    pub fn new(config: &ToolsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("switchboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: config.inference_base_url.clone(),
            model: config.sentiment_model.clone(),
            api_token: config.hf_api_token.clone(),
            client,
        }
    }

    async fn classify(&self, text: &str) -> Result<Vec<SentimentScore>> {
        let token = validate_api_key(self.api_token.as_deref().unwrap_or_default(), "HF_API_TOKEN")?;
        let url = format!(
            "{}/{}",
            sanitize_base_url(&self.base_url, "inference_base_url")?,
            self.model
        );

        tracing::debug!(model = %self.model, chars = text.len(), "sentiment analysis");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RouterError::ToolExecutionFailed {
                tool_name: self.name().to_string(),
                error: format!("inference API returned {}: {}", status, text.trim()),
            });
        }

        let body: InferenceResponse = response.json().await?;
        Ok(body.into_scores())
    }
}

#[async_trait]
impl Tool for SentimentTool {
    fn name(&self) -> &str {
        "sentiment_analysis"
    }

    fn description(&self) -> &str {
        "Perform sentiment analysis on input text, determining whether its tone is positive or negative."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "The text to analyze"}
            },
            "required": ["text"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: SentimentArgs = parse_args(self.name(), args)?;
        let scores = self.classify(&args.text).await?;
        Ok(serde_json::to_value(scores)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_fails_without_network() {
        let tool = SentimentTool::new(&ToolsConfig::default());
        let err = tool.call(json!({"text": "What a lovely evening"})).await.unwrap_err();
        assert!(matches!(err, RouterError::MissingConfig { key } if key == "HF_API_TOKEN"));
    }

    #[test]
    fn test_nested_and_flat_responses_decode() {
        let nested: InferenceResponse = serde_json::from_value(json!([[
            {"label": "POSITIVE", "score": 0.99},
            {"label": "NEGATIVE", "score": 0.01}
        ]]))
        .unwrap();
        let scores = nested.into_scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].label, "POSITIVE");

        let flat: InferenceResponse =
            serde_json::from_value(json!([{"label": "NEGATIVE", "score": 0.7}])).unwrap();
        assert_eq!(flat.into_scores()[0].label, "NEGATIVE");
    }
}
