// src/config.rs

//! Configuration loading utilities.
//!
//! Reads the TOML configuration file and applies environment overrides.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;

/// Overrides `live.relay_url`.
pub const RELAY_URL_ENV: &str = "GEOPROBE_RELAY_URL";

/// Overrides the configuration file path.
pub const CONFIG_PATH_ENV: &str = "GEOPROBE_CONFIG";

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "data/config.toml";

/// Resolve the configuration path: explicit argument, then environment, then
/// the default location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from a TOML file with environment overrides.
///
/// Falls back to defaults if the file cannot be loaded.
pub fn load_config(path: &Path) -> Config {
    let mut config = Config::load_or_default(path);
    apply_env(&mut config, |key| env::var(key).ok());
    config
}

/// Load configuration strictly: a missing or malformed file is an error.
pub fn load_config_strict(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)
        .map_err(|e| AppError::config(format!("Failed to load {}: {e}", path.display())))?;
    apply_env(&mut config, |key| env::var(key).ok());
    Ok(config)
}

fn apply_env(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(relay) = lookup(RELAY_URL_ENV).filter(|v| !v.trim().is_empty()) {
        log::debug!("Relay URL overridden by {}", RELAY_URL_ENV);
        config.live.relay_url = relay;
    }
}
