//! Supervisor / Worker agents
//!
//! A supervisor routes each request to exactly one specialized worker.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  SUPERVISOR       One routing call, at most one dispatch    │
//! │  - Keyword or structured (`{"next": ...}`) routing          │
//! │  - Bookkeeping: current/completed agents, artifacts         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  WORKERS          CallModel <-> ExecuteTools loop           │
//! │  - script_maker, box_maker, research                        │
//! │  - Final replies repaired into {chain_of_thought, result}   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TOOLS            Independent JSON-in / JSON-out functions  │
//! │  - calculate_material, search, summarize, sentiment         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use switchboard_core::agent::Supervisor;
//! use switchboard_core::config::{Config, RunConfig};
//! use switchboard_core::llm::ChatMessage;
//!
//! let config = Config::resolve(None)?;
//! let supervisor = Supervisor::new(&config);
//! let state = supervisor
//!     .invoke(vec![ChatMessage::user("Design a 30x20x15 box")], &RunConfig::new())
//!     .await?;
//! println!("{:?}", state.current_agent);
//! ```

pub mod prompts;
pub mod reply;
pub mod routing;
pub mod state;
pub mod supervisor;
pub mod tool;
pub mod tools;
pub mod worker;

mod integration_tests;

pub use reply::{repair, StructuredReply};
pub use routing::{keyword_route, parse_structured, RoutingDecision};
pub use state::{AgentState, Artifact, RunMetadata, SupervisorState};
pub use supervisor::Supervisor;
pub use tool::{Tool, ToolRegistry};
pub use worker::{WorkerAgent, WorkerKind, WorkerSettings, WorkerStep};
