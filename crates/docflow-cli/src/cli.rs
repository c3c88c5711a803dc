//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docflow - drop-folder document extraction and matching pipeline.
#[derive(Debug, Parser)]
#[command(name = "docflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "docflow.toml")]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch the folders and process until interrupted (default)
    Run,

    /// Run a single iteration, print the metrics summary, and exit
    Once,
}
