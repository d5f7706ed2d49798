//! Built-in tool implementations for the worker agents.
//!
//! # Tool Sets
//! - **Script maker**: sentiment analysis
//! - **Box maker**: material calculation
//! - **Research**: web search, summarization

pub mod material;
pub mod sentiment;
pub mod summarize;
pub mod web_search;

pub use material::{estimate_material, CalculateMaterialTool, MaterialEstimate};
pub use sentiment::{SentimentScore, SentimentTool};
pub use summarize::{summarize_text, SummarizeTool, SUMMARY_WORD_LIMIT};
pub use web_search::{SearchResult, WebSearchTool};
