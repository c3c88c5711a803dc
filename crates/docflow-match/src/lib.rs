//! Docflow Matching Adapter
//!
//! Reconciles an extracted artifact against the reference table through the
//! text model. The adapter owns three things:
//!
//! - loading and validating the delimited reference table
//! - building the matching prompt from a configurable template
//! - parsing the model's JSON answer into a validated [`MatchVerdict`]
//!
//! Whether a verdict is *accepted* is not decided here; that policy lives
//! in the domain routing function and is applied by the orchestrator.
//!
//! [`MatchVerdict`]: docflow_domain::MatchVerdict

#![warn(missing_docs)]

mod error;
mod matcher;
mod parser;
mod prompt;
mod table;

pub use error::MatchError;
pub use matcher::Matcher;
pub use parser::parse_verdict;
pub use prompt::{build_match_prompt, DEFAULT_MATCH_TEMPLATE};
pub use table::{ReferenceRow, ReferenceTable, REQUIRED_COLUMNS};
