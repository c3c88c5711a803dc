//! Error types for pipeline operations

use thiserror::Error;

/// Errors that abort a whole pass (per-file failures never surface here)
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Folder listing or other pass-level I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reference table unusable this pass
    #[error("Reference table error: {0}")]
    Table(String),

    /// Verdict record could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration rejected at construction
    #[error("Configuration error: {0}")]
    Config(String),
}
