//! Logging bootstrap.
//!
//! Logs go to stderr through env_logger; `RUST_LOG` overrides the default
//! filter. Initialization is safe to call more than once.

use env_logger::Env;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global logger; returns false if one was already installed
pub fn init_logging(default_filter: &str) -> bool {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
