// Load Velocity - Core Library
// Exposes all modules for use in the batch CLI, the API server, and tests

pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod load;
pub mod lock;
pub mod logging;
pub mod parser;
pub mod store;
pub mod velocity;
pub mod window;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use batch::{open_output, run_batch, BatchSummary};
pub use db::{setup_database, SqliteLoadStore};
pub use error::{IngestError, InputError, StoreError, StoreResult};
pub use ingest::LoadIngestor;
pub use load::{LoadRecord, LoadResponse};
pub use lock::CustomerLocks;
pub use parser::{parse_load, RawLoad};
pub use store::{LoadStore, MemoryLoadStore};
pub use velocity::{DeclineReason, LoadValidator, VelocityDecision, VelocityLimits, VelocityValidator};
pub use window::{day_window, week_to_date_window, TimeWindow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
