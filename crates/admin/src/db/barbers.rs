//! Barber repository for database operations.

use chrono::NaiveTime;
use sqlx::PgPool;

use royal_barber_core::schedule::{Barber, BarberProfile};
use royal_barber_core::types::{BarberId, RecordStatus, TimeWindow, WorkDays};

use super::RepositoryError;

const BARBER_COLUMNS: &str = "id, name, specialty, status, working_days, \
     start_time, end_time, break_start, break_end";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` barber queries.
#[derive(Debug, sqlx::FromRow)]
struct BarberRow {
    id: i32,
    name: String,
    specialty: Option<String>,
    status: String,
    working_days: Vec<i16>,
    start_time: NaiveTime,
    end_time: NaiveTime,
    break_start: Option<NaiveTime>,
    break_end: Option<NaiveTime>,
}

impl TryFrom<BarberRow> for Barber {
    type Error = RepositoryError;

    fn try_from(row: BarberRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("invalid barber {id}: {e}"))
        };

        let status: RecordStatus = row.status.parse().map_err(|e: String| corrupt(&e))?;
        let days = row
            .working_days
            .iter()
            .map(|&day| u8::try_from(day))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| corrupt(&e))?;
        let working_days = WorkDays::from_days(days).map_err(|e| corrupt(&e))?;
        let hours = TimeWindow::new(row.start_time, row.end_time).map_err(|e| corrupt(&e))?;
        let break_window = match (row.break_start, row.break_end) {
            (Some(start), Some(end)) => Some(TimeWindow::new(start, end).map_err(|e| corrupt(&e))?),
            (None, None) => None,
            _ => return Err(corrupt(&"break has only one end")),
        };

        Ok(Self {
            id: BarberId::new(id),
            name: row.name,
            specialty: row.specialty,
            status,
            working_days,
            hours,
            break_window,
        })
    }
}

fn days_to_db(days: WorkDays) -> Vec<i16> {
    days.days().into_iter().map(i16::from).collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for barber database operations.
pub struct BarberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BarberRepository<'a> {
    /// Create a new barber repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all barbers, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Barber>, RepositoryError> {
        let rows = sqlx::query_as::<_, BarberRow>(&format!(
            "SELECT {BARBER_COLUMNS} FROM barbers ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a barber by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: BarberId) -> Result<Option<Barber>, RepositoryError> {
        let row = sqlx::query_as::<_, BarberRow>(&format!(
            "SELECT {BARBER_COLUMNS} FROM barbers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a barber.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, profile: &BarberProfile) -> Result<Barber, RepositoryError> {
        let row = sqlx::query_as::<_, BarberRow>(&format!(
            r"
            INSERT INTO barbers (name, specialty, status, working_days,
                                 start_time, end_time, break_start, break_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {BARBER_COLUMNS}
            "
        ))
        .bind(&profile.name)
        .bind(&profile.specialty)
        .bind(profile.status.as_str())
        .bind(days_to_db(profile.working_days))
        .bind(profile.hours.start())
        .bind(profile.hours.end())
        .bind(profile.break_window.map(|brk| brk.start()))
        .bind(profile.break_window.map(|brk| brk.end()))
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Replace a barber's profile. Returns `None` if the barber does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: BarberId,
        profile: &BarberProfile,
    ) -> Result<Option<Barber>, RepositoryError> {
        let row = sqlx::query_as::<_, BarberRow>(&format!(
            r"
            UPDATE barbers
            SET name = $2, specialty = $3, status = $4, working_days = $5,
                start_time = $6, end_time = $7, break_start = $8, break_end = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BARBER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&profile.name)
        .bind(&profile.specialty)
        .bind(profile.status.as_str())
        .bind(days_to_db(profile.working_days))
        .bind(profile.hours.start())
        .bind(profile.hours.end())
        .bind(profile.break_window.map(|brk| brk.start()))
        .bind(profile.break_window.map(|brk| brk.end()))
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete a barber. Returns `false` if the barber does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if services or appointments reference the barber.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: BarberId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM barbers WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(format!("barber {id} is still referenced"));
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
