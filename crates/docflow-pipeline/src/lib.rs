//! Docflow Pipeline
//!
//! The two-stage batch orchestrator and its loop driver. This is the only
//! part of the system with non-trivial state-transition and policy logic;
//! the extraction and matching adapters it drives are thin.
//!
//! # Stages
//!
//! - **Stage 1 (extraction)**: drain the incoming folder. Each file ends in
//!   exactly one of `processed` or `errors`; successful extractions leave a
//!   `<stem>.txt` artifact in `extracted`.
//! - **Stage 2 (matching)**: reconcile artifacts against the reference
//!   table, one oracle call per artifact. Accepted matches move to
//!   `matches` with a verdict record and the matched row; everything else
//!   stays in `extracted` for a later pass.
//!
//! Stage 2 only runs when Stage 1 extracted something this iteration and
//! the reference table file exists - matching is expensive and an idle
//! loop must not re-interrogate an unchanged artifact set.
//!
//! # Usage
//!
//! ```no_run
//! use docflow_extract::TextExtractor;
//! use docflow_llm::ChatClient;
//! use docflow_match::Matcher;
//! use docflow_pipeline::{FileProcessor, PipelineConfig, PipelineWorker};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! config.ensure_folders()?;
//!
//! let vision = ChatClient::new("http://localhost:8080", 120);
//! let text = ChatClient::new("http://localhost:8081", 120).with_temperature(0.0);
//!
//! let processor = FileProcessor::new(
//!     TextExtractor::new(vision, ""),
//!     Matcher::new(text, ""),
//!     config,
//! );
//!
//! // Run until Ctrl+C
//! let mut worker = PipelineWorker::new(processor);
//! worker.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod processor;
mod worker;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use metrics::PipelineMetrics;
pub use processor::{ExtractionReport, FileProcessor, MatchingReport};
pub use worker::PipelineWorker;
