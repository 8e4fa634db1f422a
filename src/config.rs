//! Command-line / environment configuration for both binaries.
//!
//! A flag wins over its environment variable, which wins over the default.
//! Variables may also come from a `.env` file; the real environment wins over it.

use crate::velocity::VelocityLimits;
use anyhow::{bail, Result};
use clap::{Args, Parser};
use log::debug;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_PATH: &str = "loads.db";

/// Load `.env` from the working directory or a parent, if there is one.
/// Call before parsing arguments. A missing or unreadable file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) => {
            debug!("no .env loaded: {}", e);
            None
        }
    }
}

/// Load variables from a specific env file without overriding ones already set
pub fn load_env_file(path: impl AsRef<Path>) -> Result<()> {
    dotenvy::from_path(path.as_ref())?;
    Ok(())
}

/// Velocity limit overrides shared by the CLI and the server
#[derive(Args, Debug, Clone)]
pub struct LimitArgs {
    /// Same-day loads allowed before further loads that day are declined
    #[arg(long, env = "VELOCITY_DAILY_COUNT", default_value_t = 3)]
    pub daily_count_limit: usize,

    /// Daily load cap in cents
    #[arg(long, env = "VELOCITY_DAILY_AMOUNT", default_value_t = 500_000)]
    pub daily_amount_limit: i64,

    /// Week-to-date load cap in cents
    #[arg(long, env = "VELOCITY_WEEKLY_AMOUNT", default_value_t = 2_000_000)]
    pub weekly_amount_limit: i64,
}

impl LimitArgs {
    pub fn limits(&self) -> Result<VelocityLimits> {
        if self.daily_count_limit == 0 {
            bail!("daily count limit must be at least 1");
        }
        if self.daily_amount_limit <= 0 || self.weekly_amount_limit <= 0 {
            bail!("amount limits must be positive");
        }

        Ok(VelocityLimits {
            max_daily_loads: self.daily_count_limit,
            max_daily_amount: self.daily_amount_limit,
            max_weekly_amount: self.weekly_amount_limit,
        })
    }
}

/// Evaluate a file of newline-delimited load records
#[derive(Parser, Debug)]
#[command(name = "load-velocity", version, about)]
pub struct BatchArgs {
    /// Input file, one JSON load per line
    #[arg(long, env = "INPUT_FILE")]
    pub file: PathBuf,

    /// Append results here instead of printing them
    #[arg(long, env = "OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,

    /// SQLite database path (":memory:" for a throwaway run)
    #[arg(long, env = "DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    #[command(flatten)]
    pub limits: LimitArgs,
}

/// Serve load evaluations over HTTP
#[derive(Parser, Debug)]
#[command(name = "load-velocity-server", version, about)]
pub struct ServerArgs {
    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "APP_PORT", default_value_t = 8080)]
    pub port: u16,

    #[command(flatten)]
    pub limits: LimitArgs,
}

impl ServerArgs {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
