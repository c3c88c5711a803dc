//! Text-layer extraction for PDF documents

use crate::error::ExtractError;
use std::path::Path;

/// Extract the embedded text layer of a document
///
/// Runs `pdf-extract` under `spawn_blocking` since parsing is CPU-bound.
/// A document that parses but yields only whitespace (a pure scan with no
/// text layer) is a failure: the caller routes such files to `errors`
/// instead of producing an empty artifact.
pub async fn document_text(path: &Path) -> Result<String, ExtractError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let owned = path.to_path_buf();

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
        .await
        .map_err(|e| ExtractError::Join(e.to_string()))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Empty(file_name));
    }

    tracing::debug!(
        file = %file_name,
        chars = trimmed.len(),
        "extracted document text layer"
    );
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = document_text(Path::new("/nonexistent/report.pdf")).await;
        assert!(result.is_err());
    }
}
