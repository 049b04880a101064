//! Appointment repository for database operations.
//!
//! Writes that place an appointment on the calendar run in a transaction that
//! first takes `pg_advisory_xact_lock(barber_id, day)`, then re-reads the
//! barber's appointments for that date and refuses the write on overlap. The
//! lock serializes writers for one (barber, date) across every process sharing
//! the database.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use royal_barber_core::schedule::Appointment;
use royal_barber_core::types::{AppointmentId, AppointmentStatus, BarberId, Phone, ServiceId};

use super::{AppointmentDraft, AppointmentFilter, RepositoryError, minutes_from_db, minutes_to_db};

const APPOINTMENT_COLUMNS: &str = "id, client_name, client_phone, service_id, barber_id, \
     date, time, duration_minutes, status, notes, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` appointment queries.
#[derive(Debug, sqlx::FromRow)]
struct AppointmentRow {
    id: i32,
    client_name: String,
    client_phone: String,
    service_id: i32,
    barber_id: i32,
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: i32,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = RepositoryError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let client_phone = Phone::parse(&row.client_phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in appointment {}: {e}", row.id))
        })?;
        let status: AppointmentStatus = row.status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("appointment {}: {e}", row.id))
        })?;

        Ok(Self {
            id: AppointmentId::new(row.id),
            client_name: row.client_name,
            client_phone,
            service_id: ServiceId::new(row.service_id),
            barber_id: BarberId::new(row.barber_id),
            date: row.date,
            time: row.time,
            duration_minutes: minutes_from_db(row.duration_minutes)?,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for appointment database operations.
pub struct AppointmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AppointmentRepository<'a> {
    /// Create a new appointment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an appointment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List appointments matching `filter`, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            r"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::date IS NULL OR date = $2)
              AND ($3::int IS NULL OR barber_id = $3)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(filter.status.map(AppointmentStatus::as_str))
        .bind(filter.date)
        .bind(filter.barber_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Every appointment of a barber on a date, ordered by time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn for_barber_on(
        &self,
        barber: BarberId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        fetch_day(self.pool, barber, date).await
    }

    /// Insert an appointment unless it overlaps another one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on overlap.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn insert(&self, draft: &AppointmentDraft) -> Result<Appointment, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_day(&mut tx, draft.barber_id, draft.date).await?;
        ensure_free(&mut tx, draft, None).await?;

        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            r"
            INSERT INTO appointments (client_name, client_phone, service_id, barber_id,
                                      date, time, duration_minutes, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {APPOINTMENT_COLUMNS}
            "
        ))
        .bind(&draft.client_name)
        .bind(draft.client_phone.as_str())
        .bind(draft.service_id)
        .bind(draft.barber_id)
        .bind(draft.date)
        .bind(draft.time)
        .bind(minutes_to_db(draft.duration_minutes)?)
        .bind(draft.status.as_str())
        .bind(&draft.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into()
    }

    /// Replace an appointment while its status is still `expected`.
    ///
    /// Returns `None` if the appointment is gone or its status changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new interval overlaps another appointment.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: AppointmentId,
        expected: AppointmentStatus,
        draft: &AppointmentDraft,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_day(&mut tx, draft.barber_id, draft.date).await?;
        ensure_free(&mut tx, draft, Some(id)).await?;

        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            r"
            UPDATE appointments
            SET client_name = $3, client_phone = $4, service_id = $5, barber_id = $6,
                date = $7, time = $8, duration_minutes = $9, status = $10, notes = $11,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {APPOINTMENT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(&draft.client_name)
        .bind(draft.client_phone.as_str())
        .bind(draft.service_id)
        .bind(draft.barber_id)
        .bind(draft.date)
        .bind(draft.time)
        .bind(minutes_to_db(draft.duration_minutes)?)
        .bind(draft.status.as_str())
        .bind(&draft.notes)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Compare-and-set the status. Returns `None` if the status is no longer `from`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            r"
            UPDATE appointments
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {APPOINTMENT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

async fn fetch_day<'e, E: PgExecutor<'e>>(
    executor: E,
    barber: BarberId,
    date: NaiveDate,
) -> Result<Vec<Appointment>, RepositoryError> {
    let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
        r"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE barber_id = $1 AND date = $2
        ORDER BY time, id
        "
    ))
    .bind(barber)
    .bind(date)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

/// Serialize writers for one (barber, date) until the transaction ends.
async fn lock_day(
    tx: &mut Transaction<'_, Postgres>,
    barber: BarberId,
    date: NaiveDate,
) -> Result<(), RepositoryError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(barber.as_i32())
        .bind(date.num_days_from_ce())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Fail with `Conflict` if `draft` overlaps a non-cancelled appointment other than `exclude`.
async fn ensure_free(
    tx: &mut Transaction<'_, Postgres>,
    draft: &AppointmentDraft,
    exclude: Option<AppointmentId>,
) -> Result<(), RepositoryError> {
    let interval = draft.interval();
    let existing = fetch_day(&mut **tx, draft.barber_id, draft.date).await?;
    let clash = existing.iter().find(|appointment| {
        Some(appointment.id) != exclude
            && appointment.status.blocks_slot()
            && appointment.interval().overlaps(&interval)
    });

    match clash {
        Some(appointment) => Err(RepositoryError::Conflict(format!(
            "overlaps appointment {}",
            appointment.id
        ))),
        None => Ok(()),
    }
}
