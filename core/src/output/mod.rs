//! Output formatting module
//!
//! Handles display of supervisor results using colored output.

use crate::agent::{SupervisorState, WorkerKind};
use crate::error::RouterError;
use crate::util::strip_code_fence;
use console::Style;
use serde_json::Value;

/// Pull the user-facing answer out of a final reply
///
/// Returns whichever of `final_script`, `final_design` or `final_report` is
/// present, else the raw text.
pub fn extract_response(content: &str) -> String {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(strip_code_fence(content)) else {
        return content.to_string();
    };

    WorkerKind::ALL
        .iter()
        .find_map(|kind| object.get(kind.result_field()))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| content.to_string())
}

/// Output formatter for CLI results
pub struct OutputFormatter {
    blue: Style,
    green: Style,
    red: Style,
    dim: Style,
    bold: Style,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self {
            blue: Style::new().blue(),
            green: Style::new().green(),
            red: Style::new().red(),
            dim: Style::new().dim(),
            bold: Style::new().bold(),
        }
    }
}

impl OutputFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the query being processed
    pub fn print_query(&self, query: &str) {
        println!();
        println!("{} {}", self.bold.apply_to("QUERY:"), self.blue.apply_to(query));
    }

    /// Print the dispatched agent and its answer
    pub fn print_result(&self, state: &SupervisorState) {
        let agent = state
            .current_agent
            .map(|kind| kind.name().to_string())
            .unwrap_or_else(|| "none".to_string());
        println!("{} {}", self.bold.apply_to("AGENT:"), self.green.apply_to(agent));

        let response = state
            .final_message()
            .map(|m| extract_response(&m.content))
            .unwrap_or_default();
        println!("{}", self.bold.apply_to("RESPONSE:"));
        println!("{}", response);
        println!("{}", self.dim.apply_to(format!("trace: {}", state.metadata.trace_id)));
    }

    /// Print the full final state as pretty JSON
    pub fn print_json(&self, state: &SupervisorState) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(state)?);
        Ok(())
    }

    /// Print an error message
    pub fn print_error(&self, error: &RouterError) {
        eprintln!("{} {}", self.red.apply_to("Error:"), error.user_message());
    }
}
