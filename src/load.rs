// 💵 Load Records - the unit the velocity engine reasons about
// Money is kept in integer minor units (cents) so sums never drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// LOAD RECORD
// ============================================================================

/// A single money-load transaction for a customer.
///
/// `(customer_id, transaction_id)` is unique across everything ever persisted.
/// `accepted` is written once, at evaluation time, and never revised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRecord {
    /// Store-assigned id (None until persisted)
    pub id: Option<i64>,

    pub customer_id: i64,

    /// Caller-supplied id, unique per customer
    pub transaction_id: i64,

    /// Amount in minor units (cents), always > 0
    pub amount: i64,

    /// Always UTC; day/week boundaries come from its UTC calendar date
    pub time: DateTime<Utc>,

    pub accepted: bool,
}

impl LoadRecord {
    /// Build an unevaluated, unpersisted record
    pub fn new(customer_id: i64, transaction_id: i64, amount: i64, time: DateTime<Utc>) -> Self {
        LoadRecord {
            id: None,
            customer_id,
            transaction_id,
            amount,
            time,
            accepted: false,
        }
    }
}

// ============================================================================
// OUTPUT RECORD
// ============================================================================

/// Output line / response body: `{"id":..,"customer_id":..,"accepted":..}`
///
/// `id` is the caller's transaction id, not the store id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResponse {
    pub id: i64,
    pub customer_id: i64,
    pub accepted: bool,
}

impl From<&LoadRecord> for LoadResponse {
    fn from(record: &LoadRecord) -> Self {
        Self {
            id: record.transaction_id,
            customer_id: record.customer_id,
            accepted: record.accepted,
        }
    }
}
