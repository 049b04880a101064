//! Cache of candidate slots.
//!
//! Candidate slots depend only on the barber, the service, the date and the
//! shop configuration, so they are cached per (barber, service, date) and
//! dropped whenever one of those inputs is edited. Booked appointments are
//! subtracted on every read and never cached.
//!
//! Every entry is stamped with the cache generation the reader observed
//! before loading its inputs. Edits bump the generation, so a fill computed
//! from inputs read before an edit lands under a key no later read asks for.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use moka::future::Cache;
use tracing::{debug, warn};

use royal_barber_core::schedule::{Barber, Service, ShopConfig, Slot, generate_slots};
use royal_barber_core::types::{BarberId, ServiceId};

use crate::config::SlotCacheConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotKey {
    barber_id: BarberId,
    service_id: ServiceId,
    date: NaiveDate,
    generation: u64,
}

/// Candidate slots keyed by (barber, service, date).
#[derive(Clone)]
pub struct SlotCache {
    cache: Cache<SlotKey, Arc<Vec<Slot>>>,
    generation: Arc<AtomicU64>,
}

impl SlotCache {
    #[must_use]
    pub fn new(config: SlotCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.ttl)
            .support_invalidation_closures()
            .build();
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current generation. Read it before loading the barber, service and
    /// configuration that are passed to [`SlotCache::candidates`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Candidate slots, generated on a miss.
    pub async fn candidates(
        &self,
        generation: u64,
        barber: &Barber,
        service: &Service,
        date: NaiveDate,
        config: &ShopConfig,
    ) -> Arc<Vec<Slot>> {
        let key = SlotKey {
            barber_id: barber.id,
            service_id: service.id,
            date,
            generation,
        };
        self.cache
            .get_with(key, async {
                debug!(
                    barber_id = %barber.id,
                    service_id = %service.id,
                    %date,
                    generation,
                    "Generating slots"
                );
                Arc::new(generate_slots(barber, service, date, config))
            })
            .await
    }

    /// Start a new generation after a barber, service or configuration edit
    /// has been committed, and drop entries from earlier generations.
    pub fn invalidate(&self) {
        let current = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if let Err(e) = self
            .cache
            .invalidate_entries_if(move |key, _| key.generation < current)
        {
            warn!(error = %e, "Selective slot invalidation failed, clearing cache");
            self.cache.invalidate_all();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;

    use royal_barber_core::schedule::{BarberProfile, ServiceProfile};
    use royal_barber_core::types::{Price, RecordStatus, TimeWindow, WorkDays};

    use super::*;

    fn fixtures() -> (Barber, Service, ShopConfig) {
        let barber = BarberProfile {
            name: "Carlos Silva".to_string(),
            specialty: None,
            status: RecordStatus::Active,
            working_days: WorkDays::MON_TO_SAT,
            hours: TimeWindow::parse("09:00", "12:00").unwrap(),
            break_window: None,
        }
        .into_barber(BarberId::new(1));
        let service = ServiceProfile {
            name: "Corte Masculino".to_string(),
            description: None,
            duration_minutes: 30,
            price: Price::from_amount(Decimal::new(45, 0)).unwrap(),
            status: RecordStatus::Active,
            barber_id: None,
        }
        .into_service(ServiceId::new(1));
        let config = ShopConfig {
            active_days: WorkDays::MON_TO_SAT,
            hours: TimeWindow::parse("08:00", "20:00").unwrap(),
            buffer_minutes: 0,
            blocked_dates: Vec::new(),
        };
        (barber, service, config)
    }

    fn cache() -> SlotCache {
        SlotCache::new(SlotCacheConfig {
            ttl: Duration::from_secs(300),
            capacity: 100,
        })
    }

    #[tokio::test]
    async fn test_hit_returns_cached_candidates() {
        let (barber, service, config) = fixtures();
        let date = NaiveDate::from_ymd_opt(2024, 12, 23).unwrap();
        let cache = cache();

        let first = cache
            .candidates(cache.generation(), &barber, &service, date, &config)
            .await;
        assert_eq!(first.len(), 6);

        // A stale configuration is not consulted on a hit.
        let closed = ShopConfig {
            active_days: WorkDays::NONE,
            ..config.clone()
        };
        let second = cache
            .candidates(cache.generation(), &barber, &service, date, &closed)
            .await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_invalidate_regenerates() {
        let (barber, service, config) = fixtures();
        let date = NaiveDate::from_ymd_opt(2024, 12, 23).unwrap();
        let cache = cache();

        cache
            .candidates(cache.generation(), &barber, &service, date, &config)
            .await;
        cache.invalidate();
        cache.cache.run_pending_tasks().await;

        let closed = ShopConfig {
            active_days: WorkDays::NONE,
            ..config
        };
        let after = cache
            .candidates(cache.generation(), &barber, &service, date, &closed)
            .await;
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn test_fill_from_inputs_read_before_an_edit_is_not_served() {
        let (barber, service, config) = fixtures();
        let date = NaiveDate::from_ymd_opt(2024, 12, 23).unwrap();
        let cache = cache();

        // A reader observes the generation and loads the barber, then the
        // barber is edited before the reader fills the cache.
        let observed = cache.generation();
        let edited = Barber {
            working_days: WorkDays::NONE,
            ..barber.clone()
        };
        cache.invalidate();
        let stale = cache
            .candidates(observed, &barber, &service, date, &config)
            .await;
        assert_eq!(stale.len(), 6);

        let fresh = cache
            .candidates(cache.generation(), &edited, &service, date, &config)
            .await;
        assert!(fresh.is_empty());
    }
}
