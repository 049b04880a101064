//! Persistence for barbers, services, appointments and shop configuration.
//!
//! # Stores
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx, one repository per table
//! - [`MemoryStore`] - process memory, for tests and local demos
//!
//! Both implement [`BookingStore`]. Appointment writes are conditional: an
//! insert or reschedule fails with [`RepositoryError::Conflict`] when the
//! interval overlaps another non-cancelled appointment of the same barber and
//! date, so two racing writers can never both commit.
//!
//! ## Tables
//!
//! - `barbers` - Barbers and their weekly schedule
//! - `services` - Bookable services with price and duration
//! - `appointments` - Bookings (status stored as text)
//! - `shop_config` - Single row of business-wide rules
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p royal-barber-cli -- migrate
//! ```

pub mod appointments;
pub mod barbers;
pub mod memory;
pub mod postgres;
pub mod services;
pub mod shop_config;

use std::future::Future;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use royal_barber_core::schedule::{
    Appointment, Barber, BarberProfile, Service, ServiceProfile, ShopConfig,
};
use royal_barber_core::types::{
    AppointmentId, AppointmentStatus, BarberId, Interval, Phone, ServiceId,
};

pub use appointments::AppointmentRepository;
pub use barbers::BarberRepository;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use services::ServiceRepository;
pub use shop_config::ShopConfigRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (overlapping appointment, referenced row).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Appointment fields written by inserts and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub client_name: String,
    pub client_phone: Phone,
    pub service_id: ServiceId,
    pub barber_id: BarberId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl AppointmentDraft {
    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::starting_at(self.time, self.duration_minutes)
    }
}

impl From<&Appointment> for AppointmentDraft {
    fn from(appointment: &Appointment) -> Self {
        Self {
            client_name: appointment.client_name.clone(),
            client_phone: appointment.client_phone.clone(),
            service_id: appointment.service_id,
            barber_id: appointment.barber_id,
            date: appointment.date,
            time: appointment.time,
            duration_minutes: appointment.duration_minutes,
            status: appointment.status,
            notes: appointment.notes.clone(),
        }
    }
}

/// Filters for listing appointments. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub barber_id: Option<BarberId>,
}

impl AppointmentFilter {
    #[must_use]
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.status.is_none_or(|status| appointment.status == status)
            && self.date.is_none_or(|date| appointment.date == date)
            && self.barber_id.is_none_or(|id| appointment.barber_id == id)
    }
}

/// Storage used by the booking service.
///
/// `update_*` and `delete_*` methods return `Ok(None)` / `Ok(false)` when the
/// row does not exist. Deleting a barber or service that appointments still
/// reference fails with [`RepositoryError::Conflict`].
pub trait BookingStore: Send + Sync + 'static {
    // ---- barbers ----------------------------------------------------------

    /// All barbers, ordered by id.
    fn list_barbers(&self) -> impl Future<Output = Result<Vec<Barber>, RepositoryError>> + Send;

    fn get_barber(
        &self,
        id: BarberId,
    ) -> impl Future<Output = Result<Option<Barber>, RepositoryError>> + Send;

    fn create_barber(
        &self,
        profile: &BarberProfile,
    ) -> impl Future<Output = Result<Barber, RepositoryError>> + Send;

    fn update_barber(
        &self,
        id: BarberId,
        profile: &BarberProfile,
    ) -> impl Future<Output = Result<Option<Barber>, RepositoryError>> + Send;

    fn delete_barber(
        &self,
        id: BarberId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    // ---- services ---------------------------------------------------------

    /// All services, ordered by id.
    fn list_services(&self)
    -> impl Future<Output = Result<Vec<Service>, RepositoryError>> + Send;

    fn get_service(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, RepositoryError>> + Send;

    fn create_service(
        &self,
        profile: &ServiceProfile,
    ) -> impl Future<Output = Result<Service, RepositoryError>> + Send;

    fn update_service(
        &self,
        id: ServiceId,
        profile: &ServiceProfile,
    ) -> impl Future<Output = Result<Option<Service>, RepositoryError>> + Send;

    fn delete_service(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    // ---- shop configuration -----------------------------------------------

    /// The current configuration, [`RepositoryError::NotFound`] if none was saved.
    fn shop_config(&self) -> impl Future<Output = Result<ShopConfig, RepositoryError>> + Send;

    fn save_shop_config(
        &self,
        config: &ShopConfig,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    // ---- appointments -----------------------------------------------------

    fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> impl Future<Output = Result<Option<Appointment>, RepositoryError>> + Send;

    /// Appointments matching `filter`, most recently created first.
    fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> impl Future<Output = Result<Vec<Appointment>, RepositoryError>> + Send;

    /// Every appointment of one barber on one date (any status), ordered by time.
    fn appointments_for(
        &self,
        barber: BarberId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Appointment>, RepositoryError>> + Send;

    /// Insert unless the interval overlaps a non-cancelled appointment of the
    /// same barber and date.
    fn insert_appointment(
        &self,
        draft: &AppointmentDraft,
    ) -> impl Future<Output = Result<Appointment, RepositoryError>> + Send;

    /// Replace an appointment's fields.
    ///
    /// Applies only while the stored status equals `expected` (otherwise
    /// `Ok(None)`), and fails with [`RepositoryError::Conflict`] if the new
    /// interval overlaps another non-cancelled appointment.
    fn update_appointment(
        &self,
        id: AppointmentId,
        expected: AppointmentStatus,
        draft: &AppointmentDraft,
    ) -> impl Future<Output = Result<Option<Appointment>, RepositoryError>> + Send;

    /// Set the status to `to` only while it is still `from`; `Ok(None)` otherwise.
    fn update_status(
        &self,
        id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> impl Future<Output = Result<Option<Appointment>, RepositoryError>> + Send;

    // ---- health -----------------------------------------------------------

    /// Check that the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert a minute count to the `INTEGER` column type.
pub(crate) fn minutes_to_db(minutes: u32) -> Result<i32, RepositoryError> {
    i32::try_from(minutes)
        .map_err(|_| RepositoryError::DataCorruption(format!("duration {minutes} out of range")))
}

/// Convert an `INTEGER` column back to minutes.
pub(crate) fn minutes_from_db(minutes: i32) -> Result<u32, RepositoryError> {
    u32::try_from(minutes)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative duration {minutes}")))
}
