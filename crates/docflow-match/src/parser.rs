//! Parse oracle output into a validated verdict

use crate::error::MatchError;
use docflow_domain::{Confidence, MatchVerdict};
use serde_json::Value;

/// Parse the oracle's JSON response into a verdict
///
/// Models sometimes wrap JSON in markdown code blocks despite instructions;
/// fences are stripped before parsing. Anything else malformed - missing
/// or non-numeric confidence, confidence outside [0, 1], a negative or
/// fractional row number - is an error, which the orchestrator treats as
/// "no decision", never as a low-confidence match.
pub fn parse_verdict(response: &str) -> Result<MatchVerdict, MatchError> {
    let json_str = strip_code_fences(response);

    let value: Value = serde_json::from_str(json_str.trim())
        .map_err(|e| MatchError::InvalidVerdict(format!("JSON parse error: {}", e)))?;

    let obj = value
        .as_object()
        .ok_or_else(|| MatchError::InvalidVerdict("Expected a JSON object".to_string()))?;

    let raw_confidence = obj
        .get("confidence")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| MatchError::InvalidVerdict("Missing or invalid 'confidence'".to_string()))?;

    let confidence = Confidence::new(raw_confidence).ok_or_else(|| {
        MatchError::InvalidVerdict(format!("Confidence {} outside [0, 1]", raw_confidence))
    })?;

    let row_number = match obj.get("row_number") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_u64().ok_or_else(|| {
            MatchError::InvalidVerdict(format!("'row_number' must be a non-negative integer, got {}", v))
        })? as usize),
    };

    let rationale = obj
        .get("rationale")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok(MatchVerdict::new(confidence, row_number, rationale))
}

/// Strip a markdown code fence if the whole response is wrapped in one
fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return String::new();
        }
        // Drop the opening ```json / ``` line and the closing ``` line
        let inner = &lines[1..lines.len().saturating_sub(1)];
        inner.join("\n")
    } else {
        trimmed.to_string()
    }
}
