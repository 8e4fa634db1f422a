use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufReader;

use load_velocity::batch::open_output;
use load_velocity::config::{load_dotenv, BatchArgs};
use load_velocity::logging::{init_logging, DEFAULT_LOG_FILTER};
use load_velocity::{run_batch, LoadIngestor, SqliteLoadStore, VelocityValidator};

fn main() -> Result<()> {
    load_dotenv();
    init_logging(DEFAULT_LOG_FILTER);

    let args = BatchArgs::parse();
    run_import(&args)
}

fn run_import(args: &BatchArgs) -> Result<()> {
    let limits = args.limits.limits()?;

    // 1. Open database
    let store = SqliteLoadStore::open(&args.database)
        .with_context(|| format!("Unable to open database {:?}", args.database))?;
    info!("database opened: {:?}", args.database);

    let ingestor = LoadIngestor::new(store, VelocityValidator::with_limits(limits));

    // 2. Open input
    let input = File::open(&args.file)
        .with_context(|| format!("Unable to open input file {:?}", args.file))?;
    let reader = BufReader::new(input);

    // 3. Evaluate into the output file (appended) or stdout
    let writer = open_output(args.output_file.as_deref())?;

    let summary = run_batch(&ingestor, reader, writer)?;
    info!("{} loads evaluated from {:?}", summary.processed, args.file);

    Ok(())
}
