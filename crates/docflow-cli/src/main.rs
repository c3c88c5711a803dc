//! Docflow - drop-folder document extraction and matching pipeline.

use clap::Parser;
use docflow_cli::{AppConfig, Cli, CliError, Command};
use docflow_extract::TextExtractor;
use docflow_llm::ChatClient;
use docflow_match::Matcher;
use docflow_pipeline::{FileProcessor, PipelineWorker};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> docflow_cli::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.debug);

    if !cli.config.exists() {
        return Err(CliError::Config(format!(
            "configuration file not found: {}",
            cli.config.display()
        )));
    }
    let config = AppConfig::load(&cli.config)?;
    config.validate()?;

    let pipeline_config = config.pipeline();
    pipeline_config.ensure_folders()?;

    info!(config = %cli.config.display(), "configuration loaded");
    info!(incoming = %pipeline_config.incoming_dir.display(), "watch folder");
    info!(extracted = %pipeline_config.extracted_dir.display(), "extracted folder");
    info!(processed = %pipeline_config.processed_dir.display(), "processed folder");
    info!(errors = %pipeline_config.errors_dir.display(), "errors folder");
    info!(matches = %pipeline_config.matches_dir.display(), "matches folder");
    info!(vision = %config.llm.vision_endpoint, text = %config.llm.text_endpoint, "endpoints");

    let vision = ChatClient::new(&config.llm.vision_endpoint, config.llm.timeout_secs)
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens);
    // Matching wants determinism, not creativity
    let text = ChatClient::new(&config.llm.text_endpoint, config.llm.timeout_secs)
        .with_temperature(0.0)
        .with_max_tokens(config.llm.max_tokens);

    let processor = FileProcessor::new(
        TextExtractor::new(vision, config.prompts.ocr.as_str()),
        Matcher::new(text, config.prompts.matching.as_str()),
        pipeline_config,
    );
    let mut worker = PipelineWorker::new(processor);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!("starting pipeline, press Ctrl+C to stop");
            worker.run().await?;
        }
        Command::Once => {
            worker.run_cycles(1).await;
            println!("{}", worker.metrics().summary());
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
