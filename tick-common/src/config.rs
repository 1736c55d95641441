//! Bootstrap configuration file resolution and loading

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name used under the platform config directory
pub const CONFIG_DIR_NAME: &str = "tickstream";

/// File name of the bootstrap configuration
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the bootstrap config file in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. User config directory (`~/.config/tickstream/config.toml` on Linux)
/// 4. System-wide `/etc/tickstream/config.toml` (Unix only)
///
/// An explicitly named file (1 or 2) must exist. Missing default locations
/// yield `Ok(None)` and the caller falls back to built-in defaults.
pub fn resolve_config_file(cli_arg: Option<&Path>, env_var_name: &str) -> Result<Option<PathBuf>> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return require_existing(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return require_existing(PathBuf::from(path));
        }
    }

    // Priority 3 and 4: platform locations
    Ok(default_config_locations().into_iter().find(|p| p.exists()))
}

/// Parse a TOML file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let value = toml::from_str(&content)?;
    debug!("Loaded configuration from {}", path.display());
    Ok(value)
}

fn require_existing(path: PathBuf) -> Result<Option<PathBuf>> {
    if path.exists() {
        Ok(Some(path))
    } else {
        Err(Error::Config(format!("Config file not found: {}", path.display())))
    }
}

fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    if cfg!(unix) {
        locations.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    locations
}
