pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod util;

// Re-exports for convenience
pub use agent::{Supervisor, SupervisorState, WorkerKind};
pub use config::{Config, RunConfig};
pub use error::{Result, RouterError};
