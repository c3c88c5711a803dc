//! Source file classification
//!
//! Files in the incoming folder are classified by extension only; content
//! sniffing is deliberately out of scope. The extension sets come from
//! configuration so operators can widen them without a rebuild.

use std::path::{Path, PathBuf};

/// What kind of extraction a source file needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Raster image, extracted through the vision model
    Image,
    /// Document with an embedded text layer
    Document,
    /// Extension not in either configured set
    Unsupported,
}

/// Classifies file extensions into source kinds
#[derive(Debug, Clone)]
pub struct Classifier {
    image_extensions: Vec<String>,
    document_extensions: Vec<String>,
}

impl Classifier {
    /// Create a classifier from configured extension sets
    ///
    /// Extensions are normalized: lowercased, leading dots stripped, so
    /// `".JPG"`, `"jpg"`, and `"JPG"` all configure the same extension.
    pub fn new<I, D>(image_extensions: I, document_extensions: D) -> Self
    where
        I: IntoIterator<Item = String>,
        D: IntoIterator<Item = String>,
    {
        fn normalize(ext: String) -> String {
            ext.trim_start_matches('.').to_ascii_lowercase()
        }

        Self {
            image_extensions: image_extensions.into_iter().map(normalize).collect(),
            document_extensions: document_extensions.into_iter().map(normalize).collect(),
        }
    }

    /// Classify a (already lowercased) extension
    pub fn classify(&self, extension: &str) -> SourceKind {
        if self.image_extensions.iter().any(|e| e == extension) {
            SourceKind::Image
        } else if self.document_extensions.iter().any(|e| e == extension) {
            SourceKind::Document
        } else {
            SourceKind::Unsupported
        }
    }
}

/// A file discovered in the incoming folder at the start of a pass
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Base name without extension; names the extracted artifact
    pub stem: String,
    /// Lowercased extension without the dot; empty if the file has none
    pub extension: String,
    /// Classification derived from the extension
    pub kind: SourceKind,
}

impl SourceFile {
    /// Build a SourceFile from a path, classifying it on the way in
    pub fn from_path(path: &Path, classifier: &Classifier) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let kind = classifier.classify(&extension);

        Self {
            path: path.to_path_buf(),
            stem,
            extension,
            kind,
        }
    }

    /// File name including extension, for log lines
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(
            vec!["jpg".into(), "jpeg".into(), "png".into()],
            vec!["pdf".into()],
        )
    }

    #[test]
    fn test_classify_image() {
        assert_eq!(classifier().classify("jpg"), SourceKind::Image);
        assert_eq!(classifier().classify("png"), SourceKind::Image);
    }

    #[test]
    fn test_classify_document() {
        assert_eq!(classifier().classify("pdf"), SourceKind::Document);
    }

    #[test]
    fn test_classify_unsupported() {
        assert_eq!(classifier().classify("docx"), SourceKind::Unsupported);
        assert_eq!(classifier().classify(""), SourceKind::Unsupported);
    }

    #[test]
    fn test_extension_normalization() {
        let c = Classifier::new(vec![".JPG".into()], vec!["PDF".into()]);
        assert_eq!(c.classify("jpg"), SourceKind::Image);
        assert_eq!(c.classify("pdf"), SourceKind::Document);
    }

    #[test]
    fn test_source_file_from_path() {
        let file = SourceFile::from_path(Path::new("/drop/Invoice-042.PDF"), &classifier());
        assert_eq!(file.stem, "Invoice-042");
        assert_eq!(file.extension, "pdf");
        assert_eq!(file.kind, SourceKind::Document);
        assert_eq!(file.file_name(), "Invoice-042.PDF");
    }

    #[test]
    fn test_source_file_without_extension() {
        let file = SourceFile::from_path(Path::new("/drop/README"), &classifier());
        assert_eq!(file.stem, "README");
        assert_eq!(file.extension, "");
        assert_eq!(file.kind, SourceKind::Unsupported);
    }
}
