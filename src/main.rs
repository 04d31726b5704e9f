//! ddrgen - Detailed Diagnostic Report generator
//!
//! Usage:
//!   ddrgen generate --inspection a.pdf --thermal b.pdf   Write an entity-locked DDR
//!   ddrgen parse --inspection a.pdf                      Deterministic parse as JSON

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;

use ddrgen_lib::config;
use ddrgen_lib::pipeline::extraction::{ExtractionError, PdfTextExtractor, PdfiumBackend};
use ddrgen_lib::pipeline::llm::{GeminiClient, LlmError, RateGate};
use ddrgen_lib::pipeline::processor::{parse_report, FailureKind, PipelineError, ReportProcessor};
use ddrgen_lib::pipeline::vision::{LlmImageAnalyzer, RenderSettings};
use ddrgen_lib::pipeline_config::{ConfigError, ImageFallback, PipelineConfig};

#[derive(Parser)]
#[command(name = "ddrgen")]
#[command(about = "Entity-locked Detailed Diagnostic Report generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report from an inspection PDF and a thermal PDF
    Generate {
        /// Inspection report PDF
        #[arg(long, value_name = "PDF")]
        inspection: PathBuf,

        /// Thermal imaging report PDF
        #[arg(long, value_name = "PDF")]
        thermal: PathBuf,

        /// Output markdown file (default: ~/DDR-Reports/DDR_Report.md)
        #[arg(short, long, value_name = "MD")]
        output: Option<PathBuf>,

        /// Area-count ceiling
        #[arg(long, value_name = "N")]
        max_areas: Option<usize>,

        /// Generation model name
        #[arg(long)]
        model: Option<String>,
    },

    /// Parse an inspection PDF without calling the model and print JSON
    Parse {
        /// Inspection report PDF
        #[arg(long, value_name = "PDF")]
        inspection: PathBuf,

        /// Area-count ceiling
        #[arg(long, value_name = "N")]
        max_areas: Option<usize>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Cannot write report to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    fn kind(&self) -> FailureKind {
        match self {
            CliError::Config(_) => FailureKind::Configuration,
            CliError::Llm(LlmError::MissingApiKey(_)) => FailureKind::Configuration,
            CliError::Llm(_) => FailureKind::Service,
            CliError::Extraction(_) | CliError::Output { .. } => FailureKind::Document,
            CliError::Pipeline(e) => e.kind(),
            CliError::Serialization(_) => FailureKind::InternalConsistency,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Pipeline(e) => e.hint(),
            CliError::Llm(LlmError::MissingApiKey(_)) => {
                Some("Export GEMINI_API_KEY before running `ddrgen generate`.")
            }
            CliError::Extraction(ExtractionError::PdfiumUnavailable(_)) => Some(
                "Install the PDFium library or point PDFIUM_DYNAMIC_LIB_PATH at it.",
            ),
            _ => None,
        }
    }
}

/// Process exit code per failure category.
fn exit_code(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::InputStructure => 2,
        FailureKind::EntityLock => 3,
        FailureKind::Quota => 4,
        FailureKind::Transient => 5,
        FailureKind::Service => 6,
        FailureKind::Configuration => 7,
        FailureKind::InternalConsistency => 8,
        FailureKind::Document => 9,
    }
}

/// Environment config with command-line overrides applied.
fn load_config(max_areas: Option<usize>, model: Option<String>) -> Result<PipelineConfig, CliError> {
    let mut cfg = PipelineConfig::from_env()?;
    apply_overrides(&mut cfg, max_areas, model)?;
    Ok(cfg)
}

fn apply_overrides(
    cfg: &mut PipelineConfig,
    max_areas: Option<usize>,
    model: Option<String>,
) -> Result<(), ConfigError> {
    if let Some(max) = max_areas {
        if max == 0 {
            return Err(ConfigError::Zero { key: "--max-areas" });
        }
        cfg.max_areas = max;
    }
    if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
        cfg.model = model.trim().to_string();
    }
    Ok(())
}

fn write_report(path: &Path, markdown: &str) -> Result<(), CliError> {
    let to_error = |source| CliError::Output {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_error)?;
    }
    std::fs::write(path, markdown).map_err(to_error)
}

fn read_pdf(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| {
        CliError::Pipeline(PipelineError::Io {
            path: path.display().to_string(),
            source,
        })
    })
}

fn generate(
    inspection: &Path,
    thermal: &Path,
    output: Option<PathBuf>,
    cfg: PipelineConfig,
) -> Result<(), CliError> {
    let api_key = std::env::var(config::ENV_API_KEY).unwrap_or_default();
    let client = GeminiClient::new(&cfg.api_base_url, &api_key, &cfg.model, cfg.request_timeout_secs)?;
    let backend = PdfiumBackend::new(cfg.jpeg_quality)?;
    let analyzer = LlmImageAnalyzer::new(&client, &backend, RenderSettings::from(&cfg));
    let mut gate = RateGate::new(cfg.requests_per_minute, cfg.requests_per_day);

    tracing::info!(
        model = %cfg.model,
        rpm = cfg.requests_per_minute,
        rpd = cfg.requests_per_day,
        max_areas = cfg.max_areas,
        "Starting {} v{}",
        config::APP_NAME,
        config::APP_VERSION
    );

    let image_fallback = cfg.image_fallback;
    let mut processor = ReportProcessor::new(cfg, &client, &backend);
    if image_fallback == ImageFallback::Enabled {
        processor = processor.with_image_source(&analyzer);
    }

    let outcome = processor.run_files(&mut gate, inspection, thermal)?;

    let path = output.unwrap_or_else(config::default_report_path);
    write_report(&path, &outcome.report_markdown)?;

    println!("Report written to {}", path.display());
    println!(
        "  areas: {}  thermal readings: {}  warnings: {}  model calls: {}",
        outcome.contract.expected_area_count(),
        outcome.contract.expected_thermal_count(),
        outcome.validation.warnings.len(),
        outcome.api_calls
    );
    let status = gate.status();
    println!(
        "  daily quota: {}/{} used",
        status.calls_today, status.daily_limit
    );
    Ok(())
}

fn parse(inspection: &Path, cfg: &PipelineConfig) -> Result<(), CliError> {
    let backend = PdfiumBackend::new(cfg.jpeg_quality)?;
    let bytes = read_pdf(inspection)?;
    let text = backend.extract_document_text(&bytes)?;
    let report = parse_report(&text, cfg.max_areas)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            inspection,
            thermal,
            output,
            max_areas,
            model,
        } => {
            let cfg = load_config(max_areas, model)?;
            generate(&inspection, &thermal, output, cfg)
        }
        Commands::Parse {
            inspection,
            max_areas,
        } => {
            let cfg = load_config(max_areas, None)?;
            parse(&inspection, &cfg)
        }
    }
}

fn main() -> ExitCode {
    ddrgen_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e.kind();
            tracing::error!(kind = kind.as_str(), error = %e, "Run failed");
            eprintln!("error ({}): {e}", kind.as_str());
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(exit_code(kind))
        }
    }
}
