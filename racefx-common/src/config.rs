//! Configuration loading and config file resolution

use crate::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-user / system-wide configuration directory
const CONFIG_DIR_NAME: &str = "racefx";

/// Logging configuration shared by every RaceFX binary
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Config file resolution, in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Per-user config directory (`<config dir>/racefx/<file_name>`)
/// 4. System-wide config (`/etc/racefx/<file_name>`, Linux only)
///
/// Sources 1 and 2 are returned as-is, even if the file does not exist, so
/// that an explicit path that is wrong is reported instead of silently
/// ignored. Sources 3 and 4 are only returned when the file exists.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file_name: &str,
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

    // Priority 3/4: platform locations
    let found = platform_config_candidates(file_name)
        .into_iter()
        .find(|candidate| candidate.exists());
    if found.is_none() {
        debug!("No {} found in platform config locations", file_name);
    }
    found
}

fn platform_config_candidates(file_name: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(CONFIG_DIR_NAME).join(file_name));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join(file_name));
    }
    candidates
}

/// Parse a TOML document into `T`
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(toml::from_str(content)?)
}

/// Read and parse a TOML file into `T`
pub fn load_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Reading config file {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_toml(&content)
}
