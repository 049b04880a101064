//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use crate::config::AdminConfig;
use crate::db::BookingStore;
use crate::services::{BookingService, SlotCache};

/// Application state shared across all handlers.
///
/// Generic over the store so the same router runs on `PostgreSQL` in
/// production and in memory in tests.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S> {
    config: AdminConfig,
    booking: BookingService<S>,
    api_token_digest: [u8; 32],
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: BookingStore> AppState<S> {
    /// Build the state around `store`.
    #[must_use]
    pub fn new(config: AdminConfig, store: S) -> Self {
        let slots = SlotCache::new(config.slot_cache);
        let booking = BookingService::new(Arc::new(store), slots);
        let api_token_digest = Sha256::digest(config.api_token.expose_secret().as_bytes()).into();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                booking,
                api_token_digest,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn booking(&self) -> &BookingService<S> {
        &self.inner.booking
    }

    #[must_use]
    pub fn store(&self) -> &S {
        self.inner.booking.store()
    }

    /// Returns `true` if `token` is the configured API token.
    ///
    /// Digests are compared instead of the raw strings so the comparison
    /// time does not depend on how many leading characters match.
    #[must_use]
    pub fn token_matches(&self, token: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        digest == self.inner.api_token_digest
    }
}
