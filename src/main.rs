//! `switchboard` - route requests to specialized LLM worker agents
//!
//! Each query goes to a supervisor which picks one worker (script maker,
//! box maker or research), runs it and prints its answer.

use anyhow::{Context, Result};
use clap::Parser;
use console::Style;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ConfigCommand};
use switchboard_core::agent::Supervisor;
use switchboard_core::config::{Config, RunConfig};
use switchboard_core::llm::ChatMessage;
use switchboard_core::output::OutputFormatter;

mod cli;

/// Queries run when none are given
const DEMO_QUERIES: [&str; 3] = [
    "I need a romantic script for a date night with my partner. We want something playful and fun.",
    "I need to design a box for shipping fragile items. It should be 30cm x 20cm x 15cm.",
    "Can you research the history of artificial intelligence and provide a summary?",
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Some(Commands::Config { cmd }) => handle_config(cmd, &cli),
        None => {
            let config = load_config(&cli)?;
            run_queries(&cli, &config).await
        }
    }
}

/// Resolve the config file and apply command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(routing) = cli.routing {
        config.routing = routing;
    }
    tracing::debug!(model = %config.model, routing = %config.routing, "configuration loaded");
    Ok(config)
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_queries(cli: &Cli, config: &Config) -> Result<()> {
    let formatter = OutputFormatter::new();
    let supervisor = Supervisor::new(config);

    let mut run = RunConfig::new();
    if let Some(model) = &cli.model {
        run = run.with_model(model.clone());
    }

    let queries: Vec<String> = if cli.query.is_empty() {
        DEMO_QUERIES.iter().map(|q| q.to_string()).collect()
    } else {
        cli.query.clone()
    };

    let mut failures = 0;
    for query in &queries {
        if !cli.json {
            formatter.print_query(query);
        }

        match supervisor.invoke(vec![ChatMessage::user(query.as_str())], &run).await {
            Ok(state) if cli.json => formatter.print_json(&state)?,
            Ok(state) => formatter.print_result(&state),
            Err(e) => {
                failures += 1;
                formatter.print_error(&e);
                if e.is_config_error() {
                    // Every remaining query would fail the same way
                    break;
                }
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} queries failed", failures, queries.len());
    }
    Ok(())
}

fn handle_config(cmd: &ConfigCommand, cli: &Cli) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let mut shown = load_config(cli)?;
            redact(&mut shown.providers.anthropic.api_key);
            redact(&mut shown.providers.openai.api_key);
            redact(&mut shown.tools.tavily_api_key);
            redact(&mut shown.tools.hf_api_token);
            print!("{}", toml::to_string_pretty(&shown).context("Failed to render configuration")?);
        }
        // Init must work before any config file exists, so it never resolves one
        ConfigCommand::Init { force } => init_config(cli, *force)?,
        ConfigCommand::Path => match Config::default_path() {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("Could not determine the config directory"),
        },
    }
    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path().context("Could not determine the config directory")?,
    };
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} {}", Style::new().green().apply_to("Wrote"), path.display());
    Ok(())
}

fn redact(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some("********".to_string());
    }
}
