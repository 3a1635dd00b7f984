//! Configuration for the sound engine
//!
//! Loaded from a TOML file. Every field has a built-in default, so an empty
//! or missing file yields a working engine.
//!
//! ```toml
//! queue_capacity = 80
//! pool_capacity = 128
//! worker_thread_name = "sound-worker"
//!
//! [logging]
//! level = "info"
//! ```

use crate::error::Result;
use racefx_common::config::{load_toml_file, parse_toml, resolve_config_path};
use racefx_common::{Error as CommonError, LoggingConfig};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "RACEFX_SOUND_CONFIG";

/// File name looked up in the platform config directories
pub const CONFIG_FILE_NAME: &str = "sound.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SoundEngineConfig {
    /// Maximum number of commands waiting for the worker
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Maximum number of idle command boxes kept for reuse
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,

    /// Name given to the worker thread
    #[serde(default = "default_worker_thread_name")]
    pub worker_thread_name: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_queue_capacity() -> usize {
    80
}

fn default_pool_capacity() -> usize {
    128
}

fn default_worker_thread_name() -> String {
    "sound-worker".to_string()
}

impl Default for SoundEngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            pool_capacity: default_pool_capacity(),
            worker_thread_name: default_worker_thread_name(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SoundEngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = load_toml_file(path)?;
        config.validate()?;
        info!("Loaded sound engine config from {}", path.display());
        Ok(config)
    }

    /// Locate and load the config file
    ///
    /// Resolution order: `cli_path`, then `RACEFX_SOUND_CONFIG`, then the
    /// platform config directories. When no file is found the built-in
    /// defaults are used.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_path, CONFIG_ENV_VAR, CONFIG_FILE_NAME) {
            Some(path) => Self::load(&path),
            None => {
                warn!("No {} found, using built-in defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(CommonError::Config("queue_capacity must be at least 1".to_string()).into());
        }
        if self.worker_thread_name.trim().is_empty() {
            return Err(CommonError::Config("worker_thread_name must not be empty".to_string()).into());
        }
        Ok(())
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }
}
