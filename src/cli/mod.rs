//! CLI argument parsing using clap 4.x derive macros

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use switchboard_core::config::RoutingStrategy;

/// Route requests to a script writer, a box designer or a research agent
///
/// A supervisor model picks one worker per query; the worker runs its own
/// model/tool loop and its answer is printed. With no query, three demo
/// queries are run.
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration commands
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Queries to route, one supervisor run each
    pub query: Vec<String>,

    /// Model for the supervisor and workers (provider/model-name)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Routing strategy (keyword or structured)
    #[arg(short, long)]
    pub routing: Option<RoutingStrategy>,

    /// Path to a config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the full final state as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (API keys redacted)
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the default config file path
    Path,
}
