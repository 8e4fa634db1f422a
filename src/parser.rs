// 🧾 Input Parser - raw JSON load records → sanitized LoadRecord
// Format: {"id":"15887","customer_id":"528","load_amount":"$3318.47","time":"2000-01-01T00:00:00Z"}

use crate::error::InputError;
use crate::load::LoadRecord;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// RAW INPUT
// ============================================================================

/// One input record exactly as received; every field is a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLoad {
    pub id: String,
    pub customer_id: String,
    pub load_amount: String,
    pub time: String,
}

impl RawLoad {
    pub fn from_json(bytes: &[u8]) -> Result<Self, InputError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Validate every field and build an unevaluated `LoadRecord`
    pub fn sanitize(&self) -> Result<LoadRecord, InputError> {
        let transaction_id = parse_id("id", &self.id)?;
        let customer_id = parse_id("customer_id", &self.customer_id)?;
        let amount = parse_amount(&self.load_amount)?;
        let time = parse_time(&self.time)?;

        Ok(LoadRecord::new(customer_id, transaction_id, amount, time))
    }
}

/// Decode one JSON line straight into a sanitized record
pub fn parse_load(bytes: &[u8]) -> Result<LoadRecord, InputError> {
    RawLoad::from_json(bytes)?.sanitize()
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

fn parse_id(field: &'static str, value: &str) -> Result<i64, InputError> {
    value.trim().parse().map_err(|_| InputError::InvalidId {
        field,
        value: value.to_string(),
    })
}

/// `"$3318.47"` → `331847`.
///
/// Decimal major units to minor units by string arithmetic: digits past the
/// second decimal place are truncated, never rounded, and no float is involved.
pub fn parse_amount(value: &str) -> Result<i64, InputError> {
    let invalid = || InputError::InvalidAmount(value.to_string());

    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };

    let mut cents = 0;
    for (place, b) in fraction.bytes().take(2).enumerate() {
        let digit = i64::from(b - b'0');
        cents += if place == 0 { digit * 10 } else { digit };
    }

    let amount = whole
        .checked_mul(100)
        .and_then(|major| major.checked_add(cents))
        .ok_or_else(invalid)?;

    if amount <= 0 {
        return Err(InputError::NonPositiveAmount(value.to_string()));
    }

    Ok(amount)
}

/// RFC3339 with any offset, normalized to UTC.
///
/// The UTC year must stay within 0001-9999; an offset can push
/// `9999-12-31T23:00:00-05:00` into year 10000.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, InputError> {
    let time = DateTime::parse_from_rfc3339(value.trim())
        .map(|time| time.with_timezone(&Utc))
        .map_err(|source| InputError::InvalidTime {
            value: value.to_string(),
            source,
        })?;

    if !(1..=9999).contains(&time.year()) {
        return Err(InputError::TimeOutOfRange(value.to_string()));
    }
    Ok(time)
}
