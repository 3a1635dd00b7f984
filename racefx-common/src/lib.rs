//! # RaceFX Common Library
//!
//! Shared code for the RaceFX crates:
//! - Common error type
//! - TOML configuration loading
//! - Configuration file resolution
//! - Logging configuration

pub mod config;
pub mod error;

pub use config::LoggingConfig;
pub use error::{Error, Result};
