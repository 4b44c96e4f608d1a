//! l2book: replay a JSON-lines command stream through a matching engine.
//!
//! Reads one command per line from `--input` (stdin by default) and
//! writes one JSON response per line to stdout. Logs go to stderr.

mod commands;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use l2book_engine::{MatchingEngine, SharedEngine};
use l2book_types::{EngineConfig, constants};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "l2book", version, about = "Price-time priority matching engine driver")]
struct Args {
    /// Engine configuration (JSON). Defaults to an unrestricted market.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-lines command file. Reads stdin when absent.
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_writer(io::stderr)).try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format)?;

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    tracing::info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        symbol = %config.market.symbol(),
        "Starting"
    );
    let engine = SharedEngine::new(MatchingEngine::new(config)?);

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    let mut processed = 0_usize;
    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = commands::process_line(&engine, line);
        serde_json::to_writer(&mut out, &response)?;
        writeln!(out)?;
        out.flush()?;
        processed += 1;
    }

    tracing::info!(
        commands = processed,
        trades = engine.snapshot().trade_count,
        digest = %engine.ledger_digest(),
        "Input exhausted"
    );
    Ok(())
}
