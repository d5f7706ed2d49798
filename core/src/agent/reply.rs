//! Structured worker replies
//!
//! Workers are asked to answer with `{"chain_of_thought": ..., "<field>": ...}`.
//! Models do not always comply, so the final text is normalised by
//! [`repair`], which never fails.

use crate::util::strip_code_fence;
use serde_json::{Map, Value};

/// Reasoning placeholder used when the model ignored the reply format
pub const FALLBACK_CHAIN_OF_THOUGHT: &str = "Processing response";

/// Reasoning-plus-result reply of a worker
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredReply {
    /// Result field name (`final_script`, `final_design`, `final_report`)
    pub field: String,
    pub chain_of_thought: Value,
    pub result: Value,
}

impl StructuredReply {
    pub fn new(field: impl Into<String>, chain_of_thought: impl Into<Value>, result: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            chain_of_thought: chain_of_thought.into(),
            result: result.into(),
        }
    }

    /// JSON object with exactly `chain_of_thought` and the result field
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("chain_of_thought".to_string(), self.chain_of_thought.clone());
        object.insert(self.field.clone(), self.result.clone());
        Value::Object(object)
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Result as display text; strings are unquoted
    pub fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Normalise a final model reply into a [`StructuredReply`] for `field`
///
/// A JSON object (optionally inside a markdown code fence) carrying both
/// `chain_of_thought` and `field` is kept; anything else becomes the
/// fallback reply with the raw text as the result. Idempotent on the
/// output of [`StructuredReply::to_json`].
pub fn repair(text: &str, field: &str) -> StructuredReply {
    let parsed = serde_json::from_str::<Value>(strip_code_fence(text));

    match parsed {
        Ok(Value::Object(mut object)) if object.contains_key("chain_of_thought") && object.contains_key(field) => {
            let chain_of_thought = object.remove("chain_of_thought").unwrap_or(Value::Null);
            let result = object.remove(field).unwrap_or(Value::Null);
            if !object.is_empty() {
                tracing::debug!(field, extra = object.len(), "dropping extra keys from structured reply");
            }
            StructuredReply::new(field, chain_of_thought, result)
        }
        Ok(_) => {
            tracing::debug!(field, "reply JSON lacks the expected keys, wrapping raw text");
            StructuredReply::new(field, FALLBACK_CHAIN_OF_THOUGHT, text)
        }
        Err(e) => {
            tracing::debug!(field, "reply is not JSON ({}), wrapping raw text", e);
            StructuredReply::new(field, FALLBACK_CHAIN_OF_THOUGHT, text)
        }
    }
}
