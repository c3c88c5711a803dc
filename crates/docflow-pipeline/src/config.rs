//! Pipeline configuration
//!
//! One value object constructed at startup and passed by reference into
//! the orchestrator and the worker; no ambient global state.

use docflow_domain::Classifier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the two-stage pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Drop folder drained by Stage 1
    pub incoming_dir: PathBuf,

    /// Stage-1 output / Stage-2 input; artifacts may remain indefinitely
    pub extracted_dir: PathBuf,

    /// Append-only archive of successfully extracted sources
    pub processed_dir: PathBuf,

    /// Append-only archive of failed sources
    pub errors_dir: PathBuf,

    /// Append-only archive of accepted matches and their companions
    pub matches_dir: PathBuf,

    /// Reference table; Stage 2 is skipped while this file is absent
    pub match_file: PathBuf,

    /// Extensions handled by the vision model
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Extensions handled by text-layer extraction
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,

    /// Minimum confidence for an accepted match, inclusive
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Reference table delimiter, exactly one byte
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: String,

    /// Delay between loop iterations (seconds)
    #[serde(default = "default_sleep_secs")]
    pub sleep_secs: u64,
}

fn default_image_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
}

fn default_document_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

fn default_confidence_threshold() -> f64 {
    0.6
}

fn default_csv_delimiter() -> String {
    ";".to_string()
}

fn default_sleep_secs() -> u64 {
    2
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            incoming_dir: PathBuf::from("incoming"),
            extracted_dir: PathBuf::from("extracted"),
            processed_dir: PathBuf::from("processed"),
            errors_dir: PathBuf::from("errors"),
            matches_dir: PathBuf::from("matches"),
            match_file: PathBuf::from("data/matchwith.csv"),
            image_extensions: default_image_extensions(),
            document_extensions: default_document_extensions(),
            confidence_threshold: default_confidence_threshold(),
            csv_delimiter: default_csv_delimiter(),
            sleep_secs: default_sleep_secs(),
        }
    }
}

impl PipelineConfig {
    /// All five folders rooted under one directory, defaults otherwise
    pub fn under_root(root: &std::path::Path) -> Self {
        Self {
            incoming_dir: root.join("incoming"),
            extracted_dir: root.join("extracted"),
            processed_dir: root.join("processed"),
            errors_dir: root.join("errors"),
            matches_dir: root.join("matches"),
            match_file: root.join("matchwith.csv"),
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        if self.csv_delimiter.as_bytes().len() != 1 {
            return Err(format!(
                "csv_delimiter must be a single byte, got '{}'",
                self.csv_delimiter
            ));
        }
        if self.image_extensions.is_empty() && self.document_extensions.is_empty() {
            return Err("at least one extension set must be non-empty".to_string());
        }
        if self.sleep_secs == 0 {
            return Err("sleep_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Create every folder the pipeline writes to
    pub fn ensure_folders(&self) -> std::io::Result<()> {
        for dir in [
            &self.incoming_dir,
            &self.extracted_dir,
            &self.processed_dir,
            &self.errors_dir,
            &self.matches_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// The table delimiter as a byte
    pub fn delimiter(&self) -> u8 {
        self.csv_delimiter.as_bytes()[0]
    }

    /// Inter-iteration delay as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sleep_secs)
    }

    /// Build the extension classifier for Stage 1
    pub fn classifier(&self) -> Classifier {
        Classifier::new(
            self.image_extensions.iter().cloned(),
            self.document_extensions.iter().cloned(),
        )
    }
}
