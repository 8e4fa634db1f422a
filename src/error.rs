//! Error taxonomy for load ingestion.
//!
//! Input errors stop at the boundary, store errors come from a `LoadStore`,
//! and ingest errors are what the orchestrator hands back per candidate.
//! A velocity decline is not an error: it is `accepted = false`.

use thiserror::Error;

/// A raw input record that cannot become a `LoadRecord`.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("unable to parse json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field}: `{value}` is not an integer")]
    InvalidId { field: &'static str, value: String },

    #[error("invalid load_amount: `{0}`")]
    InvalidAmount(String),

    #[error("load_amount must be greater than zero: `{0}`")]
    NonPositiveAmount(String),

    #[error("invalid time `{value}`: {source}")]
    InvalidTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("time out of range: `{0}` falls outside years 0001-9999 UTC")]
    TimeOutOfRange(String),
}

/// Failures surfaced by a `LoadStore`.
///
/// `NoRecord` is a normal lookup miss; everything else is `Unavailable`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no matching record found")]
    NoRecord,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NoRecord,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Per-candidate ingestion failure.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("duplicate transaction {transaction_id} for customer {customer_id}")]
    Duplicate { customer_id: i64, transaction_id: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
