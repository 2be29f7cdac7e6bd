//! Roomwalk CLI Library
//!
//! Command-line parsing, configuration loading and command execution for the
//! `roomwalk` binary.
//!
//! This library exposes the core components for testing purposes.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use cli::{Cli, Commands, InputArgs};
pub use config::{parse_environment, RenderConfig, RenderSettings};
pub use error::{ConfigError, Result};
