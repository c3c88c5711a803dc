//! The two-stage batch orchestrator
//!
//! Per-file transitions are individually atomic: a source file ends in
//! exactly one of `processed`/`errors`, and an artifact is only moved to
//! `matches` after both companion records were written. A move that fails
//! leaves the file where it was for the next pass; nothing is ever
//! silently dropped or deleted.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use docflow_domain::routing::{route_verdict, ExtractionOutcome, RoutingDecision};
use docflow_domain::traits::ChatModel;
use docflow_domain::{Classifier, MatchVerdict, SourceFile, SourceKind};
use docflow_extract::TextExtractor;
use docflow_match::{Matcher, ReferenceTable};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// Outcome counts of one Stage-1 pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Files whose artifact was written and whose source reached processed
    pub extracted: usize,
    /// Files routed to errors (unsupported or failed extraction)
    pub failed: usize,
}

/// Outcome counts of one Stage-2 pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchingReport {
    /// Artifacts promoted to matches
    pub matched: usize,
    /// Artifacts examined this pass
    pub examined: usize,
}

/// Drives Stage 1 (extraction) and Stage 2 (matching) over the folders
pub struct FileProcessor<V, T> {
    extractor: TextExtractor<V>,
    matcher: Matcher<T>,
    classifier: Classifier,
    config: PipelineConfig,
}

impl<V, T> FileProcessor<V, T>
where
    V: ChatModel,
    V::Error: std::fmt::Display,
    T: ChatModel,
    T::Error: std::fmt::Display,
{
    /// Create a processor over validated configuration
    pub fn new(
        extractor: TextExtractor<V>,
        matcher: Matcher<T>,
        config: PipelineConfig,
    ) -> Self {
        let classifier = config.classifier();
        Self {
            extractor,
            matcher,
            classifier,
            config,
        }
    }

    /// The configuration this processor runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stage 1: drain the incoming folder
    ///
    /// Returns the number of files fully extracted (artifact written AND
    /// source archived); this count gates Stage 2. A single file failing
    /// never aborts the pass; only the incoming folder itself going
    /// missing does.
    pub async fn run_extraction_pass(&self) -> Result<ExtractionReport, PipelineError> {
        let entries = list_files_sorted(&self.config.incoming_dir)?;
        let mut report = ExtractionReport::default();

        if entries.is_empty() {
            return Ok(report);
        }

        info!(files = entries.len(), "extraction pass started");

        for path in entries {
            let source = SourceFile::from_path(&path, &self.classifier);

            if source.kind == SourceKind::Unsupported {
                warn!(
                    file = %source.file_name(),
                    extension = %source.extension,
                    "unsupported extension"
                );
                self.quarantine(&source.path, &mut report);
                continue;
            }

            let outcome = match self.extractor.extract(&source).await {
                Ok(text) => ExtractionOutcome::Success { text },
                Err(e) => ExtractionOutcome::Failure {
                    reason: e.to_string(),
                },
            };

            match (outcome.routing(), &outcome) {
                (RoutingDecision::ToProcessed, ExtractionOutcome::Success { text }) => {
                    match self.complete_extraction(&source, text) {
                        Ok(artifact) => {
                            info!(
                                file = %source.file_name(),
                                artifact = %artifact.display(),
                                "extracted"
                            );
                            report.extracted += 1;
                        }
                        Err(e) => {
                            // Extracted text must not be lost: the source
                            // stays in incoming and is retried next pass.
                            error!(
                                file = %source.file_name(),
                                error = %e,
                                "could not finalize extraction, leaving source in place"
                            );
                        }
                    }
                }
                (RoutingDecision::ToErrors, ExtractionOutcome::Failure { reason }) => {
                    warn!(file = %source.file_name(), reason = %reason, "extraction failed");
                    self.quarantine(&source.path, &mut report);
                }
                (decision, _) => unreachable!("invalid stage-1 routing {:?}", decision),
            }
        }

        info!(
            extracted = report.extracted,
            failed = report.failed,
            "extraction pass complete"
        );
        Ok(report)
    }

    /// Stage 2: reconcile extracted artifacts against the reference table
    ///
    /// The table is re-read every pass. A malformed table fails the pass
    /// (the caller logs and moves on); a table with zero data rows is
    /// present-but-never-matches and costs no oracle calls.
    pub async fn run_matching_pass(&self) -> Result<MatchingReport, PipelineError> {
        let table = ReferenceTable::load(&self.config.match_file, self.config.delimiter())
            .map_err(|e| PipelineError::Table(e.to_string()))?;

        let mut report = MatchingReport::default();

        let artifacts = list_txt_sorted(&self.config.extracted_dir)?;
        if artifacts.is_empty() {
            debug!("no artifacts to match");
            return Ok(report);
        }
        if table.is_empty() {
            info!("reference table has no data rows, nothing can match");
            return Ok(report);
        }

        info!(
            artifacts = artifacts.len(),
            rows = table.len(),
            "matching pass started"
        );

        for artifact in artifacts {
            report.examined += 1;
            let name = file_name_of(&artifact);

            let text = match fs::read_to_string(&artifact) {
                Ok(text) => text,
                Err(e) => {
                    error!(file = %name, error = %e, "could not read artifact");
                    continue;
                }
            };

            let verdict = match self.matcher.evaluate(&text, &table).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!(file = %name, error = %e, "no decision, artifact stays in extracted");
                    continue;
                }
            };

            info!(
                file = %name,
                confidence = %verdict.confidence,
                row = ?verdict.row_number,
                "verdict received"
            );

            match route_verdict(&verdict, self.config.confidence_threshold, table.len()) {
                RoutingDecision::ToMatches => {
                    match self.promote_match(&artifact, &verdict, &table) {
                        Ok(()) => {
                            info!(file = %name, "artifact promoted to matches");
                            report.matched += 1;
                        }
                        Err(e) => {
                            error!(
                                file = %name,
                                error = %e,
                                "match promotion failed, artifact stays in extracted"
                            );
                        }
                    }
                }
                RoutingDecision::RemainInExtracted => {
                    info!(
                        file = %name,
                        confidence = %verdict.confidence,
                        "no accepted match, artifact remains"
                    );
                }
                decision => unreachable!("invalid stage-2 routing {:?}", decision),
            }
        }

        info!(matched = report.matched, "matching pass complete");
        Ok(report)
    }

    /// Write the artifact, then archive the source. Overwrites a stale
    /// artifact with the same stem: last extraction wins.
    fn complete_extraction(&self, source: &SourceFile, text: &str) -> io::Result<PathBuf> {
        let artifact = self
            .config
            .extracted_dir
            .join(format!("{}.txt", source.stem));
        fs::write(&artifact, text)?;
        move_file(&source.path, &self.config.processed_dir)?;
        Ok(artifact)
    }

    /// Move a failed source to errors; a failed move leaves it in place
    fn quarantine(&self, path: &Path, report: &mut ExtractionReport) {
        match move_file(path, &self.config.errors_dir) {
            Ok(dest) => {
                debug!(dest = %dest.display(), "source routed to errors");
                report.failed += 1;
            }
            Err(e) => {
                error!(
                    file = %path.display(),
                    error = %e,
                    "move to errors failed, leaving source in place"
                );
            }
        }
    }

    /// Promote an accepted artifact: both companion records are written
    /// before the artifact moves, so `matches/<stem>.txt` can never exist
    /// without its verdict record.
    fn promote_match(
        &self,
        artifact: &Path,
        verdict: &MatchVerdict,
        table: &ReferenceTable,
    ) -> Result<(), PipelineError> {
        let stem = artifact
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let row = verdict
            .row_number
            .and_then(|n| table.row(n))
            .ok_or_else(|| PipelineError::Table("accepted verdict lost its row".to_string()))?;

        let record = serde_json::json!({
            "confidence": verdict.confidence.value(),
            "row_number": verdict.row_number,
            "rationale": verdict.rationale,
            "matched_at": current_timestamp(),
        });
        let verdict_path = self.config.matches_dir.join(format!("{}_match.json", stem));
        fs::write(&verdict_path, serde_json::to_string_pretty(&record)?)?;

        let row_path = self
            .config
            .matches_dir
            .join(format!("{}_matched_row.txt", stem));
        fs::write(&row_path, row.raw(table.delimiter()))?;

        move_file(artifact, &self.config.matches_dir)?;
        Ok(())
    }
}

/// Current timestamp in seconds since Unix epoch
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List regular files directly inside a folder, lexicographic by name
///
/// Stable order within a pass so repeated runs over an unchanged folder
/// process files identically.
fn list_files_sorted(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

fn list_txt_sorted(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = list_files_sorted(dir)?;
    files.retain(|p| {
        p.extension()
            .map(|e| e.eq_ignore_ascii_case("txt"))
            .unwrap_or(false)
    });
    Ok(files)
}

/// Move a file into a folder, keeping its name
///
/// `rename` fails across filesystems; fall back to copy + remove.
fn move_file(path: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let dest = dest_dir.join(file_name);

    match fs::rename(path, &dest) {
        Ok(()) => Ok(dest),
        Err(_) => {
            fs::copy(path, &dest)?;
            fs::remove_file(path)?;
            Ok(dest)
        }
    }
}
