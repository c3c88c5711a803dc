//! Per-file routing state machine
//!
//! The folders are the only durable state; these pure functions decide the
//! next folder for a file so the policy can be tested without touching the
//! filesystem. The orchestrator applies the decision, it never invents one.

use crate::verdict::MatchVerdict;

/// Where a file goes at the end of its processing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Source file successfully extracted; archive it
    ToProcessed,
    /// Source file unsupported or extraction failed
    ToErrors,
    /// Verdict accepted; promote the artifact with its companion records
    ToMatches,
    /// No decision or confidence below threshold; retry on a later pass
    RemainInExtracted,
}

/// Result of one extraction attempt
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    /// Text was extracted
    Success {
        /// The extracted text, about to become an artifact
        text: String,
    },
    /// The adapter reported a failure
    Failure {
        /// Human-readable reason for the log and nothing else
        reason: String,
    },
}

impl ExtractionOutcome {
    /// Stage-1 transition: success archives the source, failure quarantines it
    pub fn routing(&self) -> RoutingDecision {
        match self {
            ExtractionOutcome::Success { .. } => RoutingDecision::ToProcessed,
            ExtractionOutcome::Failure { .. } => RoutingDecision::ToErrors,
        }
    }
}

/// Stage-2 transition: decide what happens to an artifact given a verdict
///
/// Accepted only when the confidence meets the threshold (inclusive) AND
/// the verdict names a row inside the current table (1-based). A row
/// reference outside `1..=table_rows` is a stale or hallucinated answer and
/// is never accepted, whatever the confidence.
pub fn route_verdict(verdict: &MatchVerdict, threshold: f64, table_rows: usize) -> RoutingDecision {
    let row_in_bounds = matches!(verdict.row_number, Some(n) if n >= 1 && n <= table_rows);

    if row_in_bounds && verdict.confidence.meets(threshold) {
        RoutingDecision::ToMatches
    } else {
        RoutingDecision::RemainInExtracted
    }
}
