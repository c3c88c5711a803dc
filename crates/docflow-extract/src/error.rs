//! Error types for extraction operations

use thiserror::Error;

/// Errors that can occur while extracting text from a source file
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Source file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be parsed
    #[error("PDF parse error: {0}")]
    Pdf(String),

    /// Parsing succeeded but produced no text
    #[error("No text extracted from {0}")]
    Empty(String),

    /// The vision model call failed or returned nothing usable
    #[error("Vision model error: {0}")]
    Vision(String),

    /// Extension outside the configured sets; no extraction attempted
    #[error("Unsupported extension: {0}")]
    Unsupported(String),

    /// Blocking task failed to join
    #[error("Task join error: {0}")]
    Join(String),
}
