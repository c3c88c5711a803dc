//! Error types for matching operations

use thiserror::Error;

/// Errors that can occur while matching an artifact
#[derive(Error, Debug)]
pub enum MatchError {
    /// Reference table unusable: missing file, missing required columns
    #[error("Reference table error: {0}")]
    Table(String),

    /// Delimited-text parsing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The oracle call itself failed
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The oracle answered, but not with a usable verdict
    #[error("Invalid verdict: {0}")]
    InvalidVerdict(String),
}
