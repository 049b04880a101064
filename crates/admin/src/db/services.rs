//! Service repository for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;

use royal_barber_core::schedule::{Service, ServiceProfile};
use royal_barber_core::types::{BarberId, CurrencyCode, Price, RecordStatus, ServiceId};

use super::{RepositoryError, minutes_from_db, minutes_to_db};

const SERVICE_COLUMNS: &str =
    "id, name, description, duration_minutes, price, currency_code, status, barber_id";

/// Internal row type for `PostgreSQL` service queries.
#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: i32,
    name: String,
    description: Option<String>,
    duration_minutes: i32,
    price: Decimal,
    currency_code: String,
    status: String,
    barber_id: Option<i32>,
}

impl TryFrom<ServiceRow> for Service {
    type Error = RepositoryError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("invalid service {id}: {e}"))
        };

        let currency: CurrencyCode = row
            .currency_code
            .trim()
            .parse()
            .map_err(|e: String| corrupt(&e))?;
        let price = Price::new(row.price, currency).map_err(|e| corrupt(&e))?;
        let status: RecordStatus = row.status.parse().map_err(|e: String| corrupt(&e))?;

        Ok(Self {
            id: ServiceId::new(id),
            name: row.name,
            description: row.description,
            duration_minutes: minutes_from_db(row.duration_minutes)?,
            price,
            status,
            barber_id: row.barber_id.map(BarberId::new),
        })
    }
}

/// Repository for service database operations.
pub struct ServiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepository<'a> {
    /// Create a new service repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all services, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a service by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the restricted barber does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, profile: &ServiceProfile) -> Result<Service, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            r"
            INSERT INTO services (name, description, duration_minutes, price,
                                  currency_code, status, barber_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SERVICE_COLUMNS}
            "
        ))
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(minutes_to_db(profile.duration_minutes)?)
        .bind(profile.price.amount())
        .bind(profile.price.currency_code().code())
        .bind(profile.status.as_str())
        .bind(profile.barber_id)
        .fetch_one(self.pool)
        .await
        .map_err(map_foreign_key)?;

        row.try_into()
    }

    /// Replace a service. Returns `None` if the service does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the restricted barber does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ServiceId,
        profile: &ServiceProfile,
    ) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            r"
            UPDATE services
            SET name = $2, description = $3, duration_minutes = $4, price = $5,
                currency_code = $6, status = $7, barber_id = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {SERVICE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(minutes_to_db(profile.duration_minutes)?)
        .bind(profile.price.amount())
        .bind(profile.price.currency_code().code())
        .bind(profile.status.as_str())
        .bind(profile.barber_id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_foreign_key)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete a service. Returns `false` if the service does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if appointments reference the service.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ServiceId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(map_foreign_key)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_foreign_key(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict(db_err.message().to_owned());
    }
    RepositoryError::Database(e)
}
