//! Extraction dispatch

use crate::error::ExtractError;
use crate::image::encode_image;
use crate::pdf::document_text;
use docflow_domain::traits::ChatModel;
use docflow_domain::{SourceFile, SourceKind};
use tracing::info;

/// Default OCR prompt when the configuration does not supply one
pub const DEFAULT_OCR_PROMPT: &str = "Please transcribe all visible text in this image.";

/// Maps a classified source file to its extracted text
pub struct TextExtractor<V> {
    vision: V,
    ocr_prompt: String,
}

impl<V> TextExtractor<V>
where
    V: ChatModel,
    V::Error: std::fmt::Display,
{
    /// Create an extractor around a vision model and an OCR prompt
    pub fn new(vision: V, ocr_prompt: impl Into<String>) -> Self {
        let ocr_prompt = ocr_prompt.into();
        Self {
            vision,
            ocr_prompt: if ocr_prompt.is_empty() {
                DEFAULT_OCR_PROMPT.to_string()
            } else {
                ocr_prompt
            },
        }
    }

    /// Extract text from a source file according to its kind
    pub async fn extract(&self, source: &SourceFile) -> Result<String, ExtractError> {
        match source.kind {
            SourceKind::Image => self.extract_from_image(source).await,
            SourceKind::Document => document_text(&source.path).await,
            SourceKind::Unsupported => Err(ExtractError::Unsupported(source.extension.clone())),
        }
    }

    async fn extract_from_image(&self, source: &SourceFile) -> Result<String, ExtractError> {
        let image = encode_image(&source.path).await?;

        let text = self
            .vision
            .generate_with_image(&self.ocr_prompt, &image)
            .await
            .map_err(|e| ExtractError::Vision(e.to_string()))?;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ExtractError::Empty(source.file_name()));
        }

        info!(
            file = %source.file_name(),
            chars = trimmed.len(),
            "vision transcription complete"
        );
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_domain::Classifier;
    use docflow_llm::MockModel;
    use std::path::Path;

    fn classifier() -> Classifier {
        Classifier::new(vec!["jpg".into(), "png".into()], vec!["pdf".into()])
    }

    fn image_source(dir: &Path) -> SourceFile {
        let path = dir.join("receipt.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();
        SourceFile::from_path(&path, &classifier())
    }

    #[tokio::test]
    async fn test_image_extraction_uses_vision_model() {
        let dir = tempfile::tempdir().unwrap();
        let source = image_source(dir.path());

        let model = MockModel::new("TOTAL 42.00 EUR");
        let extractor = TextExtractor::new(model.clone(), "transcribe");

        let text = extractor.extract(&source).await.unwrap();
        assert_eq!(text, "TOTAL 42.00 EUR");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_transcription_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = image_source(dir.path());

        let extractor = TextExtractor::new(MockModel::new("   \n"), "transcribe");
        let result = extractor.extract(&source).await;
        assert!(matches!(result, Err(ExtractError::Empty(_))));
    }

    #[tokio::test]
    async fn test_vision_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let source = image_source(dir.path());

        let mut model = MockModel::default();
        model.add_error("transcribe");
        let extractor = TextExtractor::new(model, "transcribe this");

        let result = extractor.extract(&source).await;
        assert!(matches!(result, Err(ExtractError::Vision(_))));
    }

    #[tokio::test]
    async fn test_unsupported_kind_is_rejected() {
        let source = SourceFile::from_path(Path::new("/drop/notes.docx"), &classifier());
        let extractor = TextExtractor::new(MockModel::default(), "");

        let result = extractor.extract(&source).await;
        assert!(matches!(result, Err(ExtractError::Unsupported(ext)) if ext == "docx"));
    }

    #[tokio::test]
    async fn test_empty_prompt_falls_back_to_default() {
        let extractor = TextExtractor::new(MockModel::default(), "");
        assert_eq!(extractor.ocr_prompt, DEFAULT_OCR_PROMPT);
    }
}
