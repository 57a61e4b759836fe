//! poco-codegen CLI - generates C# data classes or CRUD stored procedures
//! from a YAML/JSON schema document.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use poco_codegen::generator::{GenerationConfig, GenerationMode, generate_to_string};
use poco_codegen::import::SchemaDocument;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "poco-codegen")]
#[command(
    version,
    about = "Generate C# classes or T-SQL CRUD procedures from a schema document",
    long_about = None
)]
struct Cli {
    /// Schema document (.yaml, .yml or .json)
    #[arg(short, long)]
    schema: PathBuf,

    /// Generation config (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output mode (classes, procedures); overrides the config file
    #[arg(short, long)]
    mode: Option<GenerationMode>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log generation decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => GenerationConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GenerationConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    let model = SchemaDocument::from_file(&cli.schema)
        .and_then(SchemaDocument::into_model)
        .with_context(|| format!("Failed to import schema {}", cli.schema.display()))?;
    info!(objects = model.len(), mode = %config.mode, "schema loaded");

    let output = generate_to_string(&model, &config);
    match &cli.output {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", output),
    }
    Ok(())
}
