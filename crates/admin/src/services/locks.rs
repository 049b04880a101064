//! Per-(barber, date) booking exclusion.
//!
//! Every write that places an appointment on a barber's day holds the lock for
//! that key from before validation until the store write returns, so two
//! requests for the same barber and date are decided one after the other.
//! Entries are removed once nobody holds or waits for them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use royal_barber_core::types::BarberId;

type DayKey = (BarberId, NaiveDate);

/// Registry of async mutexes keyed by (barber, date).
#[derive(Debug, Clone, Default)]
pub struct BookingLocks {
    entries: Arc<StdMutex<HashMap<DayKey, Arc<Mutex<()>>>>>,
}

/// Held lock for one (barber, date). Released on drop.
#[derive(Debug)]
pub struct DayGuard {
    key: DayKey,
    locks: BookingLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl BookingLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `barber`'s calendar on `date`.
    pub async fn acquire(&self, barber: BarberId, date: NaiveDate) -> DayGuard {
        let key = (barber, date);
        let mutex = Arc::clone(self.entries().entry(key).or_default());
        let guard = mutex.lock_owned().await;
        DayGuard {
            key,
            locks: self.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or awaited.
    #[must_use]
    pub fn active(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<DayKey, Arc<Mutex<()>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DayGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut entries = self.locks.entries();
        // Only the registry still references the mutex: no holder, no waiter.
        if entries
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            entries.remove(&self.key);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, d).unwrap()
    }

    #[tokio::test]
    async fn test_entries_are_pruned_on_release() {
        let locks = BookingLocks::new();
        let guard = locks.acquire(BarberId::new(1), day(23)).await;
        assert_eq!(locks.active(), 1);
        drop(guard);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = BookingLocks::new();
        let guard = locks.acquire(BarberId::new(1), day(23)).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(BarberId::new(1), day(23)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_other_keys_do_not_wait() {
        let locks = BookingLocks::new();
        let _first = locks.acquire(BarberId::new(1), day(23)).await;
        let _other_barber = locks.acquire(BarberId::new(2), day(23)).await;
        let _other_day = locks.acquire(BarberId::new(1), day(24)).await;
        assert_eq!(locks.active(), 3);
    }
}
