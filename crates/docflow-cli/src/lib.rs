//! Docflow CLI - command-line entry point for the drop-folder pipeline.

pub mod cli;
pub mod config;
pub mod error;

pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use error::{CliError, Result};
