use crate::agent::tool::{parse_args, Tool};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Texts at or under this many words are returned as-is
pub const SUMMARY_WORD_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct SummarizeArgs {
    text: String,
}

/// Extractive summary: the first `SUMMARY_WORD_LIMIT` words followed by `...`
pub fn summarize_text(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= SUMMARY_WORD_LIMIT {
        return text.to_string();
    }
    format!("{}...", words[..SUMMARY_WORD_LIMIT].join(" "))
}

/// A tool for shortening long passages gathered during research.
pub struct SummarizeTool;

#[async_trait]
impl Tool for SummarizeTool {
    fn name(&self) -> &str {
        "summarize"
    }

    fn description(&self) -> &str {
        "Summarize a long piece of text into a concise version capturing the main points."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "The text to summarize"}
            },
            "required": ["text"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: SummarizeArgs = parse_args(self.name(), args)?;
        Ok(json!({ "summary": summarize_text(&args.text) }))
    }
}
