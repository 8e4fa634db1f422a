// 🗄️ Load Store - persistence contract consumed by the ingestor
// SQLite lives in `db`; the in-memory store here backs tests.

use crate::error::{StoreError, StoreResult};
use crate::load::LoadRecord;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// Read/write access to historical load records.
///
/// Lookups that find nothing return `StoreError::NoRecord`; every other
/// failure is `StoreError::Unavailable`. `append` must fail atomically.
pub trait LoadStore: Send + Sync {
    /// Fetch a record by its store-assigned id
    fn get(&self, id: i64) -> StoreResult<LoadRecord>;

    fn find_by_customer_and_transaction(
        &self,
        customer_id: i64,
        transaction_id: i64,
    ) -> StoreResult<LoadRecord>;

    /// All of a customer's records with `start <= time <= end`, in no particular order
    fn find_by_customer_in_range(
        &self,
        customer_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<LoadRecord>>;

    /// Persist a new record and return the assigned id
    fn append(&self, record: &LoadRecord) -> StoreResult<i64>;

    /// Overwrite a persisted record (matched by id)
    fn update(&self, record: &LoadRecord) -> StoreResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Vec-backed store with the same uniqueness rule as the SQLite schema.
#[derive(Debug, Default)]
pub struct MemoryLoadStore {
    records: Mutex<Vec<LoadRecord>>,
}

impl MemoryLoadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-built history, assigning ids in order
    pub fn with_records(records: impl IntoIterator<Item = LoadRecord>) -> StoreResult<Self> {
        let store = Self::new();
        for record in records {
            store.append(&record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Snapshot of everything stored
    pub fn all(&self) -> Vec<LoadRecord> {
        self.records().clone()
    }

    fn records(&self) -> MutexGuard<'_, Vec<LoadRecord>> {
        // A panic mid-push leaves the Vec valid, so poisoning is ignored
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LoadStore for MemoryLoadStore {
    fn get(&self, id: i64) -> StoreResult<LoadRecord> {
        self.records()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or(StoreError::NoRecord)
    }

    fn find_by_customer_and_transaction(
        &self,
        customer_id: i64,
        transaction_id: i64,
    ) -> StoreResult<LoadRecord> {
        self.records()
            .iter()
            .find(|r| r.customer_id == customer_id && r.transaction_id == transaction_id)
            .cloned()
            .ok_or(StoreError::NoRecord)
    }

    fn find_by_customer_in_range(
        &self,
        customer_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<LoadRecord>> {
        Ok(self
            .records()
            .iter()
            .filter(|r| r.customer_id == customer_id && r.time >= start && r.time <= end)
            .cloned()
            .collect())
    }

    fn append(&self, record: &LoadRecord) -> StoreResult<i64> {
        let mut records = self.records();

        if records
            .iter()
            .any(|r| r.customer_id == record.customer_id && r.transaction_id == record.transaction_id)
        {
            return Err(StoreError::Unavailable(format!(
                "UNIQUE constraint failed: loads.customer_id, loads.transaction_id ({}, {})",
                record.customer_id, record.transaction_id
            )));
        }

        let id = records.len() as i64 + 1;
        let mut stored = record.clone();
        stored.id = Some(id);
        records.push(stored);

        Ok(id)
    }

    fn update(&self, record: &LoadRecord) -> StoreResult<()> {
        let id = record.id.ok_or(StoreError::NoRecord)?;
        let mut records = self.records();

        let slot = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or(StoreError::NoRecord)?;
        *slot = record.clone();

        Ok(())
    }
}
