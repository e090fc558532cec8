//! Routine extraction CLI
//!
//! Reads one advising slip from disk and prints the extracted schedule as
//! JSON (or CSV). Failures print the error body as JSON and exit non-zero.

use clap::{Parser, ValueEnum};
use routine_common::{config::AppConfig, metrics::register_metrics, AppError, ErrorResponse, VERSION};
use routine_extraction::orchestrator::guess_mime_type;
use routine_extraction::{export, ExtractionError, Orchestrator, UploadedDocument};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "extract", version, about = "Extract a weekly schedule from an advising slip")]
struct Cli {
    /// Advising slip (.xlsx, .xls, .ods, .csv, .pdf or an image)
    file: PathBuf,

    /// Declared mime type; guessed from the file extension when omitted
    #[arg(long)]
    mime: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Configuration file, instead of config/ and APP__ variables
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => return fail_app(AppError::from(e)),
    };

    init_tracing(&config);
    register_metrics();

    info!("Routine extraction v{}", VERSION);

    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mime_type = cli
        .mime
        .clone()
        .or_else(|| guess_mime_type(&file_name).map(str::to_string))
        .unwrap_or_default();

    let bytes = match tokio::fs::read(&cli.file).await {
        Ok(bytes) => bytes,
        Err(e) => return fail(ExtractionError::from(e), &file_name, &mime_type),
    };

    let orchestrator = match Orchestrator::from_config(&config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => return fail(e, &file_name, &mime_type),
    };

    let upload = UploadedDocument::new(bytes, mime_type.clone(), file_name.clone());

    let result = match orchestrator.extract(&upload).await {
        Ok(result) => result,
        Err(e) => return fail(e, &file_name, &mime_type),
    };

    let output = match cli.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&result) {
            Ok(json) => json,
            Err(e) => return fail_app(AppError::from(e)),
        },
        OutputFormat::Csv => match export::to_csv(&result.events) {
            Ok(csv) => csv,
            Err(e) => return fail(e, &file_name, &mime_type),
        },
    };

    println!("{}", output);
    Ok(ExitCode::SUCCESS)
}

/// Log to stderr so stdout carries only the result.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn fail(error: ExtractionError, file_name: &str, mime_type: &str) -> anyhow::Result<ExitCode> {
    report(error.to_response(file_name, mime_type))
}

/// Failures before or after extraction proper; tracing may not be up yet
fn fail_app(error: AppError) -> anyhow::Result<ExitCode> {
    eprintln!("{}", error);
    report(ErrorResponse::from(&error))
}

fn report(response: ErrorResponse) -> anyhow::Result<ExitCode> {
    response.log();
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(ExitCode::FAILURE)
}
