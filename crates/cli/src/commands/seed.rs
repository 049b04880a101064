//! Load the demo shop into an empty database.
//!
//! Does nothing when barbers already exist, so it is safe to run twice.

use tracing::info;

use royal_barber_admin::db::PgStore;
use royal_barber_admin::seed;
use royal_barber_core::parse_date;

use super::{CommandError, connect};

/// Seed the demo data, placing bookings on the Wednesday on or after `day`.
///
/// # Errors
///
/// Returns an error if `day` is malformed or database operations fail.
pub async fn run(day: Option<&str>) -> Result<(), CommandError> {
    let day = match day {
        Some(day) => parse_date(day)?,
        None => chrono::Local::now().date_naive(),
    };

    let store = PgStore::new(connect().await?);
    let report = seed::load(&store, day).await?;

    if report.skipped {
        info!("Database already has barbers; nothing seeded");
    } else {
        info!(
            barbers = report.barbers,
            services = report.services,
            appointments = report.appointments,
            "Seed complete"
        );
    }
    Ok(())
}
