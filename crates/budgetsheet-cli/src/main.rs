use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use budgetsheet_cli::{dispatch, session, DispatchResult, Invocation};
use budgetsheet_engine::EngineConfig;

#[derive(Parser)]
#[command(name = "budgetsheet")]
#[command(about = "Budget workbook automation: product rows, zone rows, supplier sheets")]
#[command(version)]
struct Cli {
    /// Workbook document (JSON)
    #[arg(long, short = 'f', default_value = "orcamento.json")]
    file: PathBuf,

    /// Engine configuration file (JSON); built-in defaults otherwise
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Operation: insert-product-rows, insert-zone-row,
    /// create-supplier-sheets, insert-product-between-columns,
    /// delete-between-columns, add-zone, get-metadata
    operation: String,

    /// Comma-separated 1-based row numbers (e.g. "12,15")
    rows: Option<String>,

    /// Supplier name or zone label, depending on the operation
    name: Option<String>,

    /// Zone label, for callers that pass both a supplier and a zone
    zone_name: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EngineConfig::from_json(&json)?
        }
        None => EngineConfig::default(),
    };

    let invocation = Invocation {
        operation: cli.operation,
        rows: cli
            .rows
            .as_deref()
            .map(Invocation::parse_rows)
            .transpose()?
            .unwrap_or_default(),
        supplier: cli.name,
        zone_name: cli.zone_name,
    };

    let mut workbook = session::open_document(&cli.file)?;

    match dispatch(&mut workbook, &config, &invocation)? {
        DispatchResult::Mutated => {
            session::save_document(&mut workbook, &cli.file)?;
        }
        DispatchResult::Output(payload) => println!("{payload}"),
        DispatchResult::Unchanged => {}
        DispatchResult::UnknownOperation => {
            eprintln!("Unknown operation: {}", invocation.operation);
        }
    }

    Ok(ExitCode::SUCCESS)
}
