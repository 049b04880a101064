//! Booking service: appointments, catalog and dashboard over a [`BookingStore`].
//!
//! Every write that puts an appointment on a barber's day follows the same
//! sequence:
//! 1. take the (barber, date) lock from [`BookingLocks`]
//! 2. read the barber's appointments for that date
//! 3. run [`validate_booking`]
//! 4. write through the store's conditional insert or update
//!
//! The store refuses overlapping writes on its own, so even a writer that
//! bypasses the lock (another process) ends in `Conflict` rather than a double
//! booking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use royal_barber_core::BookingError;
use royal_barber_core::schedule::{
    Appointment, Barber, BarberProfile, BookingRequest, MAX_NAME_LENGTH, Service, ServiceProfile,
    ShopConfig, Slot, available_slots, validate_booking,
};
use royal_barber_core::stats::{self, DashboardSnapshot};
use royal_barber_core::types::{
    AppointmentId, AppointmentStatus, BarberId, Phone, ServiceId, parse_date, parse_time,
};

use super::availability::SlotCache;
use super::locks::BookingLocks;
use crate::db::{AppointmentDraft, AppointmentFilter, BookingStore, RepositoryError};
use crate::error::AppError;

/// Longest accepted appointment note.
pub const MAX_NOTES_LENGTH: usize = 500;

/// Request to book an appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub client_name: String,
    pub client_phone: String,
    pub service_id: ServiceId,
    pub barber_id: BarberId,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    /// Defaults to pending. Only pending or confirmed are accepted.
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial edit of an appointment. Unset fields are kept.
///
/// An empty `notes` string clears the notes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentChanges {
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub service_id: Option<ServiceId>,
    pub barber_id: Option<BarberId>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

impl AppointmentChanges {
    const fn reschedules(&self) -> bool {
        self.service_id.is_some()
            || self.barber_id.is_some()
            || self.date.is_some()
            || self.time.is_some()
    }
}

/// Dashboard snapshot tagged with the write revision it was computed after.
#[derive(Debug, Clone)]
struct StoredSnapshot {
    revision: u64,
    snapshot: DashboardSnapshot,
}

/// Booking and catalog operations shared by every handler.
pub struct BookingService<S> {
    store: Arc<S>,
    locks: BookingLocks,
    slots: SlotCache,
    dashboard: Arc<RwLock<Option<StoredSnapshot>>>,
    /// Bumped after every committed write that affects the dashboard.
    revision: Arc<AtomicU64>,
}

impl<S> Clone for BookingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: self.locks.clone(),
            slots: self.slots.clone(),
            dashboard: Arc::clone(&self.dashboard),
            revision: Arc::clone(&self.revision),
        }
    }
}

impl<S: BookingStore> BookingService<S> {
    #[must_use]
    pub fn new(store: Arc<S>, slots: SlotCache) -> Self {
        Self {
            store,
            locks: BookingLocks::new(),
            slots,
            dashboard: Arc::new(RwLock::new(None)),
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Appointments
    // =========================================================================

    /// Book an appointment.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for malformed fields or a non-initial status
    /// - `NotFound` if the barber or service does not exist
    /// - `Closed`, `OutOfHours` or `Conflict` when validation refuses the slot
    #[instrument(
        skip(self, input),
        fields(barber_id = %input.barber_id, date = %input.date, time = %input.time)
    )]
    pub async fn create_appointment(&self, input: NewAppointment) -> Result<Appointment, AppError> {
        let status = input.status.unwrap_or_default();
        if !status.is_initial() {
            return Err(BookingError::InvalidInput(format!(
                "appointments cannot be created as {status}"
            ))
            .into());
        }
        let client_name = client_name(&input.client_name)?;
        let client_phone = client_phone(&input.client_phone)?;
        let notes = notes(input.notes)?;
        let date = parse_date(&input.date)?;
        let time = parse_time(&input.time)?;

        let barber = self.barber(input.barber_id).await?;
        let service = self.service(input.service_id).await?;
        let config = self.store.shop_config().await?;

        let appointment = {
            let _guard = self.locks.acquire(barber.id, date).await;
            let existing = self.store.appointments_for(barber.id, date).await?;
            validate_booking(
                &BookingRequest {
                    barber: &barber,
                    service: &service,
                    config: &config,
                    date,
                    time,
                    exclude: None,
                },
                &existing,
            )?;

            let draft = AppointmentDraft {
                client_name,
                client_phone,
                service_id: service.id,
                barber_id: barber.id,
                date,
                time,
                duration_minutes: service.duration_minutes,
                status,
                notes,
            };
            self.store
                .insert_appointment(&draft)
                .await
                .map_err(refused_write)?
        };

        info!(appointment_id = %appointment.id, "Appointment booked");
        self.refresh_dashboard().await;
        Ok(appointment)
    }

    /// Move an appointment along one edge of the status table.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the appointment does not exist
    /// - `InvalidTransition` if the edge is not allowed, including when another
    ///   request changed the status first
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: AppointmentId,
        to: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let current = self.appointment(id).await?;
        current.status.transition(to)?;

        let Some(updated) = self.store.update_status(id, current.status, to).await? else {
            let latest = self.appointment(id).await?;
            return Err(BookingError::InvalidTransition {
                from: latest.status,
                to,
            }
            .into());
        };

        info!(from = %current.status, "Appointment status changed");
        self.refresh_dashboard().await;
        Ok(updated)
    }

    /// Edit a non-terminal appointment.
    ///
    /// Changing the barber, service, date or time re-runs booking validation
    /// with the appointment itself excluded from the overlap check, and takes
    /// the duration of the (possibly new) service.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the appointment, barber or service does not exist
    /// - `InvalidTransition` if the appointment is cancelled or completed
    /// - `InvalidInput`, `Closed`, `OutOfHours` or `Conflict` as for booking
    #[instrument(skip(self, changes), fields(appointment_id = %id))]
    pub async fn edit_appointment(
        &self,
        id: AppointmentId,
        changes: AppointmentChanges,
    ) -> Result<Appointment, AppError> {
        let current = self.appointment(id).await?;
        if current.status.is_terminal() {
            return Err(BookingError::Terminal(current.status).into());
        }

        let mut draft = AppointmentDraft::from(&current);
        if let Some(name) = &changes.client_name {
            draft.client_name = client_name(name)?;
        }
        if let Some(phone) = &changes.client_phone {
            draft.client_phone = client_phone(phone)?;
        }
        if changes.notes.is_some() {
            draft.notes = notes(changes.notes.clone())?;
        }

        let day_guard = if changes.reschedules() {
            if let Some(barber_id) = changes.barber_id {
                draft.barber_id = barber_id;
            }
            if let Some(service_id) = changes.service_id {
                draft.service_id = service_id;
            }
            if let Some(date) = &changes.date {
                draft.date = parse_date(date)?;
            }
            if let Some(time) = &changes.time {
                draft.time = parse_time(time)?;
            }

            let barber = self.barber(draft.barber_id).await?;
            let service = self.service(draft.service_id).await?;
            let config = self.store.shop_config().await?;
            draft.duration_minutes = service.duration_minutes;

            let guard = self.locks.acquire(draft.barber_id, draft.date).await;
            let existing = self
                .store
                .appointments_for(draft.barber_id, draft.date)
                .await?;
            validate_booking(
                &BookingRequest {
                    barber: &barber,
                    service: &service,
                    config: &config,
                    date: draft.date,
                    time: draft.time,
                    exclude: Some(id),
                },
                &existing,
            )?;
            Some(guard)
        } else {
            None
        };

        let updated = self
            .store
            .update_appointment(id, current.status, &draft)
            .await
            .map_err(refused_write)?;
        let Some(updated) = updated else {
            return Err(lost_race(self.appointment(id).await, draft.status));
        };
        drop(day_guard);

        info!(rescheduled = changes.reschedules(), "Appointment edited");
        self.refresh_dashboard().await;
        Ok(updated)
    }

    /// Free slots for `service` with `barber` on `date`, ascending by start.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the barber or service does not exist.
    #[instrument(skip(self))]
    pub async fn availability(
        &self,
        barber_id: BarberId,
        service_id: ServiceId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, AppError> {
        let generation = self.slots.generation();
        let barber = self.barber(barber_id).await?;
        let service = self.service(service_id).await?;
        let config = self.store.shop_config().await?;

        let candidates = self
            .slots
            .candidates(generation, &barber, &service, date, &config)
            .await;
        let existing = self.store.appointments_for(barber_id, date).await?;
        Ok(available_slots(&candidates, &existing))
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the appointment does not exist.
    pub async fn appointment(&self, id: AppointmentId) -> Result<Appointment, AppError> {
        self.store
            .get_appointment(id)
            .await?
            .ok_or_else(|| BookingError::not_found("appointment", id.as_i32()).into())
    }

    /// Appointments matching `filter`, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppError> {
        Ok(self.store.list_appointments(filter).await?)
    }

    /// Every appointment on `date` across all barbers, ordered by time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn day_schedule(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppError> {
        let filter = AppointmentFilter {
            date: Some(date),
            ..AppointmentFilter::default()
        };
        let mut appointments = self.store.list_appointments(&filter).await?;
        appointments.sort_by_key(|appointment| {
            (appointment.time, appointment.barber_id, appointment.id)
        });
        Ok(appointments)
    }

    // =========================================================================
    // Barbers
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_barbers(&self, active_only: bool) -> Result<Vec<Barber>, AppError> {
        let mut barbers = self.store.list_barbers().await?;
        if active_only {
            barbers.retain(Barber::is_active);
        }
        Ok(barbers)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the barber does not exist.
    pub async fn barber(&self, id: BarberId) -> Result<Barber, AppError> {
        self.store
            .get_barber(id)
            .await?
            .ok_or_else(|| BookingError::not_found("barber", id.as_i32()).into())
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the profile is invalid.
    #[instrument(skip(self, profile), fields(name = %profile.name))]
    pub async fn create_barber(&self, profile: BarberProfile) -> Result<Barber, AppError> {
        profile.validate()?;
        let barber = self.store.create_barber(&profile).await?;
        info!(barber_id = %barber.id, "Barber created");
        Ok(barber)
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the profile is invalid, `NotFound` if the barber does not exist.
    #[instrument(skip(self, profile), fields(barber_id = %id))]
    pub async fn update_barber(
        &self,
        id: BarberId,
        profile: BarberProfile,
    ) -> Result<Barber, AppError> {
        profile.validate()?;
        let barber = self
            .store
            .update_barber(id, &profile)
            .await?
            .ok_or_else(|| BookingError::not_found("barber", id.as_i32()))?;
        self.slots.invalidate();
        self.refresh_dashboard().await;
        Ok(barber)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the barber does not exist, `Conflict` if
    /// appointments or services still reference it.
    #[instrument(skip(self), fields(barber_id = %id))]
    pub async fn delete_barber(&self, id: BarberId) -> Result<(), AppError> {
        let deleted = self
            .store
            .delete_barber(id)
            .await
            .map_err(|e| in_use(e, "barber", id.as_i32()))?;
        if !deleted {
            return Err(BookingError::not_found("barber", id.as_i32()).into());
        }
        self.slots.invalidate();
        info!("Barber deleted");
        Ok(())
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, AppError> {
        let mut services = self.store.list_services().await?;
        if active_only {
            services.retain(|service| service.status.is_active());
        }
        Ok(services)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the service does not exist.
    pub async fn service(&self, id: ServiceId) -> Result<Service, AppError> {
        self.store
            .get_service(id)
            .await?
            .ok_or_else(|| BookingError::not_found("service", id.as_i32()).into())
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the profile is invalid, `NotFound` if it is
    /// restricted to a barber that does not exist.
    #[instrument(skip(self, profile), fields(name = %profile.name))]
    pub async fn create_service(&self, profile: ServiceProfile) -> Result<Service, AppError> {
        profile.validate()?;
        if let Some(barber_id) = profile.barber_id {
            self.barber(barber_id).await?;
        }
        let service = self.store.create_service(&profile).await?;
        info!(service_id = %service.id, "Service created");
        Ok(service)
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the profile is invalid, `NotFound` if the
    /// service or its restricted barber does not exist.
    #[instrument(skip(self, profile), fields(service_id = %id))]
    pub async fn update_service(
        &self,
        id: ServiceId,
        profile: ServiceProfile,
    ) -> Result<Service, AppError> {
        profile.validate()?;
        if let Some(barber_id) = profile.barber_id {
            self.barber(barber_id).await?;
        }
        let service = self
            .store
            .update_service(id, &profile)
            .await?
            .ok_or_else(|| BookingError::not_found("service", id.as_i32()))?;
        self.slots.invalidate();
        self.refresh_dashboard().await;
        Ok(service)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the service does not exist, `Conflict` if
    /// appointments still reference it.
    #[instrument(skip(self), fields(service_id = %id))]
    pub async fn delete_service(&self, id: ServiceId) -> Result<(), AppError> {
        let deleted = self
            .store
            .delete_service(id)
            .await
            .map_err(|e| in_use(e, "service", id.as_i32()))?;
        if !deleted {
            return Err(BookingError::not_found("service", id.as_i32()).into());
        }
        self.slots.invalidate();
        info!("Service deleted");
        Ok(())
    }

    // =========================================================================
    // Shop configuration
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the store fails or no configuration was saved yet.
    pub async fn shop_config(&self) -> Result<ShopConfig, AppError> {
        Ok(self.store.shop_config().await?)
    }

    /// Replace the shop configuration. Blocked dates are stored sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an oversized buffer or an empty blocked-date reason.
    #[instrument(skip(self, config))]
    pub async fn update_shop_config(&self, config: ShopConfig) -> Result<ShopConfig, AppError> {
        let config = config.normalized()?;
        self.store.save_shop_config(&config).await?;
        self.slots.invalidate();
        info!(
            blocked_dates = config.blocked_dates.len(),
            buffer_minutes = config.buffer_minutes,
            "Shop configuration updated"
        );
        Ok(config)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Dashboard snapshot for the local date.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot has to be recomputed and the store fails.
    pub async fn dashboard(&self) -> Result<DashboardSnapshot, AppError> {
        self.dashboard_on(Local::now().date_naive()).await
    }

    /// Dashboard snapshot for `today`, reusing the stored one when it is for
    /// the same day and no write has happened since it was computed.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot has to be recomputed and the store fails.
    pub async fn dashboard_on(&self, today: NaiveDate) -> Result<DashboardSnapshot, AppError> {
        let revision = self.revision.load(Ordering::Acquire);
        if let Some(stored) = self
            .dashboard
            .read()
            .await
            .as_ref()
            .filter(|stored| stored.snapshot.today == today && stored.revision == revision)
        {
            return Ok(stored.snapshot.clone());
        }
        self.recompute_dashboard(today).await
    }

    async fn recompute_dashboard(&self, today: NaiveDate) -> Result<DashboardSnapshot, AppError> {
        // Taken before reading, so the snapshot covers at least this revision.
        let revision = self.revision.load(Ordering::Acquire);
        let appointments = self
            .store
            .list_appointments(&AppointmentFilter::default())
            .await?;
        let services = self.store.list_services().await?;
        let barbers = self.store.list_barbers().await?;

        let snapshot = stats::compute(&appointments, &services, &barbers, today);
        self.keep_snapshot(revision, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Store `snapshot` unless one computed after a later write is already stored.
    async fn keep_snapshot(&self, revision: u64, snapshot: DashboardSnapshot) {
        let mut stored = self.dashboard.write().await;
        if stored.as_ref().is_some_and(|current| current.revision > revision) {
            debug!(revision, "Discarding outdated dashboard snapshot");
            return;
        }
        *stored = Some(StoredSnapshot { revision, snapshot });
    }

    async fn refresh_dashboard(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
        if let Err(e) = self.recompute_dashboard(Local::now().date_naive()).await {
            warn!(error = %e, "Failed to refresh dashboard snapshot");
        }
    }
}

fn client_name(name: &str) -> Result<String, BookingError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BookingError::InvalidInput(
            "client name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(BookingError::InvalidInput(format!(
            "client name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

fn client_phone(phone: &str) -> Result<Phone, BookingError> {
    Phone::parse(phone).map_err(|e| BookingError::InvalidInput(e.to_string()))
}

fn notes(notes: Option<String>) -> Result<Option<String>, BookingError> {
    let Some(notes) = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(BookingError::InvalidInput(format!(
            "notes must be at most {MAX_NOTES_LENGTH} characters"
        )));
    }
    Ok(Some(notes))
}

/// The store refused an appointment write because of an overlap.
fn refused_write(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::Conflict(_) => BookingError::overlap().into(),
        other => other.into(),
    }
}

/// Error for a conditional update that matched nothing. `latest` is the
/// appointment re-read after the miss; `requested` is the status the write
/// would have left it in.
fn lost_race(latest: Result<Appointment, AppError>, requested: AppointmentStatus) -> AppError {
    match latest {
        Ok(latest) if latest.status.is_terminal() => BookingError::Terminal(latest.status).into(),
        Ok(latest) => BookingError::InvalidTransition {
            from: latest.status,
            to: requested,
        }
        .into(),
        Err(e) => e,
    }
}

fn in_use(e: RepositoryError, entity: &'static str, id: i32) -> AppError {
    match e {
        RepositoryError::Conflict(_) => BookingError::InUse { entity, id }.into(),
        other => other.into(),
    }
}
