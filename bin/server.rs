// Load Velocity - Web Server
// One load per request, evaluated against the shared SQLite store

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::sync::Arc;

use load_velocity::config::{load_dotenv, ServerArgs};
use load_velocity::logging::{init_logging, DEFAULT_LOG_FILTER};
use load_velocity::{api, LoadIngestor, SqliteLoadStore, VelocityValidator};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    init_logging(DEFAULT_LOG_FILTER);

    let args = ServerArgs::parse();
    let limits = args.limits.limits()?;

    // Open database
    let store = SqliteLoadStore::open(&args.database)
        .with_context(|| format!("Unable to open database {:?}", args.database))?;
    info!("database opened: {:?}", args.database);

    let ingestor = Arc::new(LoadIngestor::new(store, VelocityValidator::with_limits(limits)));
    let app = api::router(ingestor);

    // Start server
    let addr = args.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("load-velocity {} listening on http://{}", load_velocity::VERSION, addr);

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
