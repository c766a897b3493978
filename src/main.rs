use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use gs_sync::app::ports::SheetSourcePort;
use gs_sync::app::sync_use_case::SyncUseCase;
use gs_sync::config::Config;
use gs_sync::infra::file_source::LocalCsvSource;
use gs_sync::infra::http_client::GvizSheetSource;
use gs_sync::infra::json_output_adapter::JsonFileSink;
use gs_sync::logging;
use gs_sync::pipeline::processing::normalize::{ColumnMatch, Normalizer};
use gs_sync::pipeline::processing::parser::parse_sheet;

#[derive(Parser)]
#[command(name = "gs_sync")]
#[command(about = "Sync the Gestão Segura process sheet into the site's JSON document")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet, aggregate it and write the JSON document (default)
    Sync {
        #[command(flatten)]
        source: SourceArgs,
        /// Output file (defaults to data/processos.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show how the column allow-list matches the sheet header
    Headers {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args, Debug, Default, Clone)]
struct SourceArgs {
    /// Config file (defaults to gs_sync.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Spreadsheet id to export
    #[arg(long)]
    spreadsheet_id: Option<String>,
    /// Sheet (tab) name to export
    #[arg(long)]
    sheet: Option<String>,
    /// Read the CSV export from a file instead of fetching it
    #[arg(long)]
    input: Option<PathBuf>,
}

fn load_config(args: &SourceArgs, output: Option<&PathBuf>) -> anyhow::Result<Config> {
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(id) = &args.spreadsheet_id {
        config.source.spreadsheet_id = id.clone();
    }
    if let Some(sheet) = &args.sheet {
        config.source.sheet_name = sheet.clone();
    }
    if let Some(path) = output {
        config.output.path = path.clone();
    }
    config.validate()?;
    Ok(config)
}

fn build_source(args: &SourceArgs, config: &Config) -> anyhow::Result<Box<dyn SheetSourcePort>> {
    match &args.input {
        Some(path) => Ok(Box::new(LocalCsvSource::new(path))),
        None => Ok(Box::new(GvizSheetSource::new(&config.source)?)),
    }
}

fn run_sync(args: &SourceArgs, config: &Config) -> anyhow::Result<()> {
    println!("🔄 Syncing process sheet...");

    let source = build_source(args, config)?;
    let sink = JsonFileSink::new(&config.output.path);
    let use_case = SyncUseCase::new(source, Box::new(sink), &config.columns);

    let result = use_case.run()?;
    info!("Sync finished");

    println!("\n📊 Sync results:");
    println!("   Rows in sheet: {}", result.source_rows);
    println!("   Unique processes: {}", result.records);
    println!("   Dropped (no protocol/name): {}", result.dropped);
    println!("   Duplicates removed: {}", result.duplicates);
    println!("   Statuses: {}", result.statuses);
    println!("   Months with data: {}", result.months);
    println!("   Output file: {}", result.output_file.display());

    if !result.missing_columns.is_empty() {
        warn!("{} allow-listed columns missing from the sheet", result.missing_columns.len());
        println!("\n⚠️  Columns not found in the sheet:");
        for column in &result.missing_columns {
            println!("   - {:?}", column);
        }
    }
    Ok(())
}

fn run_headers(args: &SourceArgs, config: &Config) -> anyhow::Result<()> {
    let source = build_source(args, config)?;
    let payload = source.fetch()?;
    let sheet = parse_sheet(&payload)?;
    let normalizer = Normalizer::from_config(&config.columns);

    println!("📋 Allow-list against {}:", source.describe().origem);
    for (rule, status) in normalizer.match_columns(&sheet.headers) {
        match status {
            ColumnMatch::Exact => println!("   ✅ {:?} -> {:?}", rule.source, rule.target()),
            ColumnMatch::WhitespaceMismatch(found) => {
                println!("   ⚠️  {:?} not found; sheet has {:?}", rule.source, found)
            }
            ColumnMatch::Missing => println!("   ❌ {:?} not found", rule.source),
        }
    }

    let unlisted: Vec<&String> = sheet
        .headers
        .iter()
        .filter(|h| !h.is_empty() && !normalizer.allow_list().iter().any(|r| r.source == **h))
        .collect();
    println!("\n   {} other columns in the sheet: {:?}", unlisted.len(), unlisted);
    Ok(())
}

fn main() -> ExitCode {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Sync {
        source: SourceArgs::default(),
        output: None,
    });

    let (args, output) = match &command {
        Commands::Sync { source, output } => (source, output.as_ref()),
        Commands::Headers { source } => (source, None),
    };

    let config = match load_config(args, output) {
        Ok(config) => config,
        Err(e) => {
            // No log directory is known yet, so report on the console subscriber
            let _ = logging::init_logging(None);
            error!("Configuration failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match logging::init_logging(config.output.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            let _ = logging::init_logging(None);
            error!("Logging setup failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match &command {
        Commands::Sync { source, .. } => run_sync(source, &config),
        Commands::Headers { source } => run_headers(source, &config),
    };

    match result {
        Ok(()) => {
            println!("\n✅ Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
