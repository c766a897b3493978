use anyhow::{Context, Result};
use clap::Parser;
use gs_sync::document::{document_schema, validate_with_schema};
use gs_sync::error::SyncError;
use serde_json::Value;
use std::{fs, path::PathBuf};

/// Validate a processos document against the v1 schema and its record counts.
#[derive(Parser, Debug)]
#[command(name = "validate-document", version, about = "Validate processos JSON against schema")]
struct Cli {
    /// Path to the document to validate
    path: PathBuf,

    /// Optional path to a schema file (defaults to the embedded v1 schema)
    #[arg(long)]
    schema: Option<PathBuf>,
}

fn load_json(path: &PathBuf) -> Result<Value> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let json: Value = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
    Ok(json)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let schema = match &args.schema {
        Some(path) => load_json(path)?,
        None => document_schema().clone(),
    };
    let instance = load_json(&args.path)?;

    match validate_with_schema(&schema, &instance) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(SyncError::InvalidDocument(problems)) => {
            eprintln!("invalid:");
            for problem in problems {
                eprintln!("- {}", problem);
            }
            std::process::exit(1)
        }
        Err(e) => Err(e.into()),
    }
}
