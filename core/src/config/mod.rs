//! Configuration management
//!
//! `Config` is the file/env backed process configuration; `RunConfig` is the
//! per-call carrier consulted when a model is loaded.

pub mod run;
pub mod store;
pub mod types;

pub use run::RunConfig;
pub use store::{Config, ProviderConfig, ProvidersConfig, ToolsConfig, DEFAULT_MODEL};
pub use types::{ConfigError, Provider, RoutingStrategy};

use std::path::PathBuf;

/// Find the configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join("switchboard.toml");
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(path) = Config::default_path() {
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Get the configuration directory path
pub fn get_config_dir() -> Option<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        return Some(dir.join("switchboard"));
    }

    dirs::home_dir().map(|home| home.join(".config").join("switchboard"))
}
