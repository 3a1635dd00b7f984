//! Common error types for RaceFX

use thiserror::Error;

/// Common result type for RaceFX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across RaceFX crates
#[derive(Error, Debug)]
pub enum Error {
    /// Config file could not be read (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document could not be parsed into the expected shape
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
