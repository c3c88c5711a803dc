//! Configuration management for the CLI.
//!
//! One TOML file describes the whole deployment: folders, endpoints,
//! processing knobs, and prompt overrides. Everything except the file
//! itself has a sensible default.

use crate::error::{CliError, Result};
use docflow_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Folder paths
    #[serde(default)]
    pub folders: FoldersConfig,

    /// Inference endpoints
    #[serde(default)]
    pub llm: LlmConfig,

    /// Processing knobs
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Prompt overrides; empty strings fall back to built-in prompts
    #[serde(default)]
    pub prompts: PromptsConfig,
}

/// Watched and output folder paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldersConfig {
    /// Drop folder drained by Stage 1
    #[serde(default = "default_incoming")]
    pub incoming: PathBuf,
    /// Extracted artifacts awaiting a match
    #[serde(default = "default_extracted")]
    pub extracted: PathBuf,
    /// Archive of successfully extracted sources
    #[serde(default = "default_processed")]
    pub processed: PathBuf,
    /// Archive of failed sources
    #[serde(default = "default_errors")]
    pub errors: PathBuf,
    /// Archive of accepted matches
    #[serde(default = "default_matches")]
    pub matches: PathBuf,
}

/// Inference endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Endpoint of the vision model used for OCR
    #[serde(default = "default_vision_endpoint")]
    pub vision_endpoint: String,
    /// Endpoint of the text model used for matching
    #[serde(default = "default_text_endpoint")]
    pub text_endpoint: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature for OCR requests
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Completion token budget per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Processing policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Extensions routed through the vision model
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    /// Extensions routed through text-layer extraction
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,
    /// Reference table file; matching is skipped while it is absent
    #[serde(default = "default_match_file")]
    pub match_file: PathBuf,
    /// Reference table delimiter, exactly one byte
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: String,
    /// Delay between loop iterations (seconds)
    #[serde(default = "default_sleep_secs")]
    pub sleep_secs: u64,
    /// Minimum confidence for an accepted match, inclusive
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

/// Prompt overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// OCR instruction sent with every image
    #[serde(default)]
    pub ocr: String,
    /// Matching template; must keep `{text}` and `{match_data}`
    #[serde(default)]
    pub matching: String,
}

fn default_incoming() -> PathBuf {
    PathBuf::from("incoming")
}
fn default_extracted() -> PathBuf {
    PathBuf::from("extracted")
}
fn default_processed() -> PathBuf {
    PathBuf::from("processed")
}
fn default_errors() -> PathBuf {
    PathBuf::from("errors")
}
fn default_matches() -> PathBuf {
    PathBuf::from("matches")
}
fn default_vision_endpoint() -> String {
    "http://localhost:8080".to_string()
}
fn default_text_endpoint() -> String {
    "http://localhost:8081".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_temperature() -> f64 {
    0.1
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_image_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
}
fn default_document_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}
fn default_match_file() -> PathBuf {
    PathBuf::from("data/matchwith.csv")
}
fn default_csv_delimiter() -> String {
    ";".to_string()
}
fn default_sleep_secs() -> u64 {
    2
}
fn default_confidence_threshold() -> f64 {
    0.6
}

impl Default for FoldersConfig {
    fn default() -> Self {
        Self {
            incoming: default_incoming(),
            extracted: default_extracted(),
            processed: default_processed(),
            errors: default_errors(),
            matches: default_matches(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            vision_endpoint: default_vision_endpoint(),
            text_endpoint: default_text_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
            document_extensions: default_document_extensions(),
            match_file: default_match_file(),
            csv_delimiter: default_csv_delimiter(),
            sleep_secs: default_sleep_secs(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.pipeline().validate().map_err(CliError::Config)?;

        if !self.prompts.matching.is_empty() {
            for placeholder in ["{text}", "{match_data}"] {
                if !self.prompts.matching.contains(placeholder) {
                    return Err(CliError::Config(format!(
                        "matching prompt template is missing the {} placeholder",
                        placeholder
                    )));
                }
            }
        }

        if self.llm.timeout_secs == 0 {
            return Err(CliError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the pipeline configuration value object.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            incoming_dir: self.folders.incoming.clone(),
            extracted_dir: self.folders.extracted.clone(),
            processed_dir: self.folders.processed.clone(),
            errors_dir: self.folders.errors.clone(),
            matches_dir: self.folders.matches.clone(),
            match_file: self.processing.match_file.clone(),
            image_extensions: self.processing.image_extensions.clone(),
            document_extensions: self.processing.document_extensions.clone(),
            confidence_threshold: self.processing.confidence_threshold,
            csv_delimiter: self.processing.csv_delimiter.clone(),
            sleep_secs: self.processing.sleep_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_toml_gets_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.folders.incoming, PathBuf::from("incoming"));
        assert_eq!(config.llm.vision_endpoint, "http://localhost:8080");
        assert_eq!(config.processing.confidence_threshold, 0.6);
        assert!(config.prompts.ocr.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let toml = r#"
            [folders]
            incoming = "/srv/drop"

            [llm]
            text_endpoint = "http://gpu-box:8081"
            timeout_secs = 30

            [processing]
            confidence_threshold = 0.75
            csv_delimiter = ","
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.folders.incoming, PathBuf::from("/srv/drop"));
        assert_eq!(config.folders.extracted, PathBuf::from("extracted"));
        assert_eq!(config.llm.text_endpoint, "http://gpu-box:8081");
        assert_eq!(config.processing.confidence_threshold, 0.75);

        let pipeline = config.pipeline();
        assert_eq!(pipeline.confidence_threshold, 0.75);
        assert_eq!(pipeline.delimiter(), b',');
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docflow.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[processing]\nsleep_secs = 10").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.processing.sleep_secs, 10);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(AppConfig::load(Path::new("/nonexistent/docflow.toml")).is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docflow.toml");
        fs::write(&path, "this is { not toml").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_matching_template_placeholder_check() {
        let mut config = AppConfig::default();
        config.prompts.matching = "no placeholders here".to_string();
        assert!(config.validate().is_err());

        config.prompts.matching = "doc {text} rows {match_data}".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_threshold_rejected() {
        let mut config = AppConfig::default();
        config.processing.confidence_threshold = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
