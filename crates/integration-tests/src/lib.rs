//! Integration tests for Royal Barber.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests, no setup required
//! cargo test -p royal-barber-integration-tests
//!
//! # PostgreSQL store tests
//! ADMIN_DATABASE_URL=postgres://... cargo test -p royal-barber-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `booking_flow` - Service-level booking lifecycle
//! - `concurrency` - Simultaneous requests for the same slot
//! - `http_api` - The admin API over a real socket
//! - `postgres_store` - Store constraints against a live database

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Client;

use royal_barber_admin::config::{AdminConfig, SlotCacheConfig};
use royal_barber_admin::db::MemoryStore;
use royal_barber_admin::seed;
use royal_barber_admin::services::{BookingService, NewAppointment, SlotCache};
use royal_barber_admin::state::AppState;
use royal_barber_core::{BarberId, ServiceId};

/// Bearer token used by [`TestServer`].
pub const API_TOKEN: &str = "itest-Wm4Qz8Rk2Vn6Yp1Ts5Hb9Lc3Jf7Gd0X";

/// Monday used as the seed day; demo bookings land on [`SEEDED_DAY`].
pub const SEED_DAY: (i32, u32, u32) = (2025, 3, 10);

/// Wednesday 2025-03-12, the day holding the demo bookings.
pub const SEEDED_DAY: (i32, u32, u32) = (2025, 3, 12);

/// Demo barbers, in seed order.
pub const CARLOS: BarberId = BarberId::new(1);
pub const MARCOS: BarberId = BarberId::new(2);
pub const ROBERTO: BarberId = BarberId::new(3);

/// Demo services, in seed order.
pub const HAIRCUT: ServiceId = ServiceId::new(1);
pub const BEARD: ServiceId = ServiceId::new(2);
pub const HAIRCUT_AND_BEARD: ServiceId = ServiceId::new(3);
pub const EYEBROWS: ServiceId = ServiceId::new(4);

#[must_use]
pub fn date((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// An in-memory store loaded with the demo shop.
pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    seed::load(&store, date(SEED_DAY)).await.unwrap();
    store
}

/// A booking service over [`seeded_store`].
pub async fn seeded_service() -> BookingService<MemoryStore> {
    BookingService::new(
        Arc::new(seeded_store().await),
        SlotCache::new(SlotCacheConfig::default()),
    )
}

/// A valid booking request; adjust fields as needed.
#[must_use]
pub fn booking(
    client: &str,
    barber_id: BarberId,
    service_id: ServiceId,
    day: NaiveDate,
    time: &str,
) -> NewAppointment {
    NewAppointment {
        client_name: client.to_string(),
        client_phone: "(11) 91234-5678".to_string(),
        service_id,
        barber_id,
        date: day.format("%Y-%m-%d").to_string(),
        time: time.to_string(),
        status: None,
        notes: None,
    }
}

/// The admin API served on an ephemeral port over [`seeded_store`].
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let state = AppState::new(AdminConfig::in_memory(API_TOKEN), seeded_store().await);
        let app = royal_barber_admin::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Request builder carrying the admin token.
    #[must_use]
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(API_TOKEN)
    }
}
