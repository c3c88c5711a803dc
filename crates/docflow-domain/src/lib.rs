//! Docflow Domain Layer
//!
//! This crate contains the core domain model for the docflow pipeline.
//! It has ZERO external dependencies and defines the fundamental value
//! objects, the per-file routing state machine, and the trait interfaces
//! that the adapter crates implement.
//!
//! ## Key Concepts
//!
//! - **SourceFile**: a file dropped into the incoming folder, classified by
//!   extension into image / document / unsupported
//! - **Confidence**: a validated score in [0, 1] reported by the matching
//!   oracle - out-of-range values cannot be constructed
//! - **MatchVerdict**: the oracle's parsed answer for one extracted artifact
//! - **RoutingDecision**: where a file goes next, computed by pure
//!   transition functions rather than inferred from folder membership
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure business logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod routing;
pub mod source;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use confidence::Confidence;
pub use routing::{route_verdict, ExtractionOutcome, RoutingDecision};
pub use source::{Classifier, SourceFile, SourceKind};
pub use verdict::MatchVerdict;
