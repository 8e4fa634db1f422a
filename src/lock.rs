//! Per-customer serialization boundary.
//!
//! Duplicate check, history fetch, and append are separate store calls; two
//! candidates for the same customer must not interleave across them. A
//! customer id is held while it sits in the set. Other customers never wait
//! on it beyond the short set update.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct CustomerLocks {
    held: Mutex<HashSet<i64>>,
    released: Condvar,
}

impl CustomerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `customer_id` is free, then hold it until the guard drops
    pub fn acquire(&self, customer_id: i64) -> CustomerGuard<'_> {
        let mut held = self.held();
        while held.contains(&customer_id) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        held.insert(customer_id);

        CustomerGuard {
            locks: self,
            customer_id,
        }
    }

    #[cfg(test)]
    fn is_held(&self, customer_id: i64) -> bool {
        self.held().contains(&customer_id)
    }

    fn held(&self) -> MutexGuard<'_, HashSet<i64>> {
        // The set is only touched by insert/remove, so a poisoned lock is still consistent
        self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the customer on drop, including during unwinding
#[must_use = "the customer is released as soon as the guard is dropped"]
pub struct CustomerGuard<'a> {
    locks: &'a CustomerLocks,
    customer_id: i64,
}

impl Drop for CustomerGuard<'_> {
    fn drop(&mut self) {
        self.locks.held().remove(&self.customer_id);
        self.locks.released.notify_all();
    }
}
