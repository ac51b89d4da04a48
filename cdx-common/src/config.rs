//! Configuration file resolution
//!
//! Resolution follows the priority order used across CDX:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config directory default (`<config_dir>/<app>/config.toml`)
//!
//! Absence of a config file is not an error; callers fall back to compiled
//! defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the configuration file path, if any exists
pub fn resolve_config_file(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    app_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config directory default
    if let Some(dir) = dirs::config_dir() {
        let candidate = dir.join(app_name).join("config.toml");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}

/// Load and deserialize a TOML configuration file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading config file: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}
