//! Loop driver for continuous pipeline operation

use crate::metrics::PipelineMetrics;
use crate::processor::FileProcessor;
use docflow_domain::traits::ChatModel;
use std::time::SystemTime;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

/// Runs the two-stage pipeline on a schedule until interrupted
///
/// Each iteration runs Stage 1; Stage 2 runs only when Stage 1 extracted
/// something AND the reference table file exists. Errors surfacing from
/// either stage are contained at the iteration boundary: logged, then the
/// loop continues after the configured delay. The process never exits over
/// a transient failure.
///
/// # Examples
///
/// ```no_run
/// use docflow_extract::TextExtractor;
/// use docflow_llm::MockModel;
/// use docflow_match::Matcher;
/// use docflow_pipeline::{FileProcessor, PipelineConfig, PipelineWorker};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let processor = FileProcessor::new(
///     TextExtractor::new(MockModel::default(), ""),
///     Matcher::new(MockModel::default(), ""),
///     PipelineConfig::default(),
/// );
/// let mut worker = PipelineWorker::new(processor);
/// worker.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineWorker<V, T> {
    processor: FileProcessor<V, T>,
    interval: Duration,
    metrics: PipelineMetrics,
}

impl<V, T> PipelineWorker<V, T>
where
    V: ChatModel,
    V::Error: std::fmt::Display,
    T: ChatModel,
    T::Error: std::fmt::Display,
{
    /// Create a worker; the delay comes from the processor's configuration
    pub fn new(processor: FileProcessor<V, T>) -> Self {
        let interval = processor.config().interval();
        Self {
            processor,
            interval,
            metrics: PipelineMetrics::new(),
        }
    }

    /// Run until a shutdown signal (Ctrl+C) is received
    ///
    /// The in-flight iteration completes before the loop exits; per-file
    /// transitions are individually atomic, so an interrupt leaves no file
    /// half-migrated.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut ticker = interval(self.interval);
        let started = SystemTime::now();

        info!(interval = ?self.interval, "pipeline worker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.iterate().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received, stopping pipeline");
                    break;
                }
            }
        }

        if let Ok(elapsed) = started.elapsed() {
            self.metrics.total_runtime_secs = elapsed.as_secs();
        }
        info!("pipeline stopped. Final metrics:\n{}", self.metrics.summary());
        Ok(())
    }

    /// Run a bounded number of iterations (useful for tests and `once`)
    pub async fn run_cycles(&mut self, cycles: usize) {
        let mut ticker = interval(self.interval);
        for cycle in 0..cycles {
            ticker.tick().await;
            debug!(cycle = cycle + 1, cycles, "iteration started");
            self.iterate().await;
        }
    }

    /// One full iteration: Stage 1, conditionally Stage 2
    async fn iterate(&mut self) {
        match self.processor.run_extraction_pass().await {
            Ok(report) => {
                self.metrics.record_extraction(report.extracted, report.failed);

                if report.extracted == 0 {
                    debug!("nothing newly extracted, skipping matching pass");
                    self.metrics.record_matching_skipped();
                } else if !self.processor.config().match_file.exists() {
                    debug!(
                        match_file = %self.processor.config().match_file.display(),
                        "no reference table, skipping matching pass"
                    );
                    self.metrics.record_matching_skipped();
                } else {
                    match self.processor.run_matching_pass().await {
                        Ok(report) => self.metrics.record_matching(report.matched),
                        Err(e) => {
                            error!(error = %e, "matching pass failed, continuing");
                        }
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "extraction pass failed, continuing");
            }
        }

        self.metrics.record_iteration();
    }

    /// Metrics accumulated so far
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Reset the metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}
