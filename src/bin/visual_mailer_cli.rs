//! Visual Mailer CLI - Bridge interface for host processes
//!
//! Commands: catalog, validate, compile, preview, save
//! Outputs JSON to stdout, logs to stderr (RUST_LOG)
//! Returns 2 on validation failure, 1 on any other error

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use visual_mailer_core::{
    constraints::Catalog, BuilderConfig, CommandEngine, EmailPipeline, PipelineError,
    TemplateStore,
};

#[derive(Parser)]
#[command(name = "visual-mailer-cli")]
#[command(about = "Visual Mailer CLI - email template validator and MJML compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the constraint catalog
    Catalog,

    /// Validate a template document
    Validate {
        /// Template JSON file, or - for stdin
        input: PathBuf,
    },

    /// Compile a template document to MJML
    Compile {
        /// Template JSON file, or - for stdin
        input: PathBuf,
    },

    /// Compile and render HTML with the configured MJML engine
    Preview {
        /// Template JSON file, or - for stdin
        input: PathBuf,
    },

    /// Compile and store the document and markup side by side
    Save {
        /// Template JSON file, or - for stdin
        input: PathBuf,

        /// Name to store under
        #[arg(short, long)]
        name: String,

        /// Store directory
        #[arg(short, long, default_value = "templates")]
        store_dir: PathBuf,
    },
}

fn read_input(path: &Path) -> Result<Value, String> {
    let mut content = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
    } else {
        content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    }
    serde_json::from_str(&content).map_err(|e| format!("Invalid JSON: {}", e))
}

fn emit(value: Value) {
    println!("{:#}", value);
}

fn fail(error: impl std::fmt::Display) -> ExitCode {
    emit(json!({ "success": false, "error": error.to_string() }));
    ExitCode::FAILURE
}

fn pipeline_failure(error: PipelineError) -> ExitCode {
    match error.validation_errors() {
        Some(errors) => {
            emit(json!({ "success": false, "valid": false, "errors": errors }));
            ExitCode::from(2) // Validation failure
        }
        None => fail(error),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match BuilderConfig::load(path) {
            Ok(c) => c,
            Err(e) => return fail(e),
        },
        None => BuilderConfig::default(),
    };

    let pipeline = EmailPipeline::new();

    match cli.command {
        Commands::Catalog => {
            match serde_json::to_value(Catalog::current()) {
                Ok(catalog) => emit(catalog),
                Err(e) => return fail(e),
            }
            ExitCode::SUCCESS
        }

        Commands::Validate { input } => {
            let candidate = match read_input(&input) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };

            let result = pipeline.validate(&candidate);
            emit(json!(result));
            if result.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Compile { input } => {
            let candidate = match read_input(&input) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };

            match pipeline.compile(&candidate) {
                Ok(compiled) => {
                    emit(json!({ "success": true, "compiled": compiled }));
                    ExitCode::SUCCESS
                }
                Err(e) => pipeline_failure(e),
            }
        }

        Commands::Preview { input } => {
            let candidate = match read_input(&input) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };

            let engine = CommandEngine::from_config(&config.preview);
            match pipeline.preview(&candidate, &engine) {
                Ok(preview) => {
                    let success = !preview.html.is_empty();
                    emit(json!({ "success": success, "preview": preview }));
                    if success {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    }
                }
                Err(e) => pipeline_failure(e),
            }
        }

        Commands::Save { input, name, store_dir } => {
            let candidate = match read_input(&input) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };

            let compiled = match pipeline.compile(&candidate) {
                Ok(c) => c,
                Err(e) => return pipeline_failure(e),
            };

            let saved = TemplateStore::open(store_dir).and_then(|store| store.save(&name, &compiled));
            match saved {
                Ok(paths) => {
                    emit(json!({
                        "success": true,
                        "id": compiled.id,
                        "documentHash": compiled.document_hash,
                        "markupHash": compiled.markup_hash,
                        "json": paths.json,
                        "mjml": paths.mjml,
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e),
            }
        }
    }
}
