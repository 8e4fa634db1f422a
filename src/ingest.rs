// 📥 Load Ingestor - duplicate check → history → validate → persist
//
// Per candidate: Received → {Rejected-Duplicate | Evaluated} → Persisted.
// Any store failure ends the candidate without a write. The customer's lock
// is held from the duplicate check through the append.

use crate::error::{IngestError, StoreError, StoreResult};
use crate::load::LoadRecord;
use crate::lock::CustomerLocks;
use crate::store::LoadStore;
use crate::velocity::LoadValidator;
use crate::window::{day_window, week_to_date_window, TimeWindow};
use log::{debug, error};

pub struct LoadIngestor<S: LoadStore, V: LoadValidator> {
    store: S,
    validator: V,
    locks: CustomerLocks,
}

impl<S: LoadStore, V: LoadValidator> LoadIngestor<S, V> {
    pub fn new(store: S, validator: V) -> Self {
        LoadIngestor {
            store,
            validator,
            locks: CustomerLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate and persist one candidate, returning the stored record.
    ///
    /// # Errors
    /// - `IngestError::Duplicate` when the `(customer_id, transaction_id)` pair
    ///   is already stored; nothing is written.
    /// - `IngestError::Store` for any store failure other than an empty lookup.
    pub fn ingest(&self, candidate: LoadRecord) -> Result<LoadRecord, IngestError> {
        let _guard = self.locks.acquire(candidate.customer_id);

        self.ensure_not_duplicate(&candidate)?;

        let same_day = self.history(&candidate, day_window(candidate.time))?;
        let week_to_date = self.history(&candidate, week_to_date_window(candidate.time))?;

        let decision = self.validator.assess(&candidate, &same_day, &week_to_date);

        let mut record = candidate;
        record.accepted = decision.accepted;

        debug!(
            "customer={} transaction={} amount={} accepted={} reasons={:?} day_loads={} week_loads={}",
            record.customer_id,
            record.transaction_id,
            record.amount,
            record.accepted,
            decision.reasons,
            same_day.len(),
            week_to_date.len()
        );

        let id = self.store.append(&record).map_err(|e| {
            error!(
                "failed to persist transaction {} for customer {}: {}",
                record.transaction_id, record.customer_id, e
            );
            e
        })?;
        record.id = Some(id);

        Ok(record)
    }

    fn ensure_not_duplicate(&self, candidate: &LoadRecord) -> Result<(), IngestError> {
        match self
            .store
            .find_by_customer_and_transaction(candidate.customer_id, candidate.transaction_id)
        {
            Ok(_) => Err(IngestError::Duplicate {
                customer_id: candidate.customer_id,
                transaction_id: candidate.transaction_id,
            }),
            Err(StoreError::NoRecord) => Ok(()),
            Err(e) => {
                error!(
                    "duplicate check failed for transaction {} (customer {}): {}",
                    candidate.transaction_id, candidate.customer_id, e
                );
                Err(e.into())
            }
        }
    }

    /// A "no matching record" answer is an empty window, not a failure
    fn history(&self, candidate: &LoadRecord, window: TimeWindow) -> StoreResult<Vec<LoadRecord>> {
        match self
            .store
            .find_by_customer_in_range(candidate.customer_id, window.start, window.end)
        {
            Ok(records) => Ok(records),
            Err(StoreError::NoRecord) => Ok(Vec::new()),
            Err(e) => {
                error!(
                    "history fetch failed for customer {} in [{}, {}]: {}",
                    candidate.customer_id, window.start, window.end, e
                );
                Err(e)
            }
        }
    }
}
