//! Shop configuration storage.
//!
//! The configuration is a single row (`id = 1`); blocked dates live in a JSONB
//! array so the whole configuration is read and replaced in one statement.

use chrono::NaiveTime;
use sqlx::PgPool;
use sqlx::types::Json;

use royal_barber_core::schedule::{BlockedDate, ShopConfig};
use royal_barber_core::types::{TimeWindow, WorkDays};

use super::{RepositoryError, minutes_from_db, minutes_to_db};

/// Internal row type for the `shop_config` table.
#[derive(Debug, sqlx::FromRow)]
struct ShopConfigRow {
    active_days: Vec<i16>,
    opening_time: NaiveTime,
    closing_time: NaiveTime,
    buffer_minutes: i32,
    blocked_dates: Json<Vec<BlockedDate>>,
}

impl TryFrom<ShopConfigRow> for ShopConfig {
    type Error = RepositoryError;

    fn try_from(row: ShopConfigRow) -> Result<Self, Self::Error> {
        let corrupt =
            |e: &dyn std::fmt::Display| RepositoryError::DataCorruption(format!("shop config: {e}"));

        let days = row
            .active_days
            .iter()
            .map(|&day| u8::try_from(day))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| corrupt(&e))?;

        Self {
            active_days: WorkDays::from_days(days).map_err(|e| corrupt(&e))?,
            hours: TimeWindow::new(row.opening_time, row.closing_time).map_err(|e| corrupt(&e))?,
            buffer_minutes: minutes_from_db(row.buffer_minutes)?,
            blocked_dates: row.blocked_dates.0,
        }
        .normalized()
        .map_err(|e| corrupt(&e))
    }
}

/// Repository for the shop configuration row.
pub struct ShopConfigRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopConfigRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the configuration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row is missing.
    /// Returns `RepositoryError::DataCorruption` if the stored values are invalid.
    pub async fn get(&self) -> Result<ShopConfig, RepositoryError> {
        let row = sqlx::query_as::<_, ShopConfigRow>(
            r"
            SELECT active_days, opening_time, closing_time, buffer_minutes, blocked_dates
            FROM shop_config
            WHERE id = 1
            ",
        )
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn save(&self, config: &ShopConfig) -> Result<(), RepositoryError> {
        let days: Vec<i16> = config.active_days.days().into_iter().map(i16::from).collect();

        sqlx::query(
            r"
            INSERT INTO shop_config (id, active_days, opening_time, closing_time,
                                     buffer_minutes, blocked_dates)
            VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET active_days = $1, opening_time = $2, closing_time = $3,
                buffer_minutes = $4, blocked_dates = $5, updated_at = NOW()
            ",
        )
        .bind(days)
        .bind(config.hours.start())
        .bind(config.hours.end())
        .bind(minutes_to_db(config.buffer_minutes)?)
        .bind(Json(&config.blocked_dates))
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
