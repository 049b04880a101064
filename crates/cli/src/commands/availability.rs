//! Print the free slots for a barber and service on a date.

use std::sync::Arc;

use royal_barber_admin::config::SlotCacheConfig;
use royal_barber_admin::db::PgStore;
use royal_barber_admin::services::{BookingService, SlotCache};
use royal_barber_core::{BarberId, ServiceId, parse_date};

use super::{CommandError, connect};

/// Look up availability through the same service the API uses.
///
/// # Errors
///
/// Returns an error for a malformed date, an unknown barber or service,
/// or a database failure.
pub async fn run(barber: BarberId, service: ServiceId, date: &str) -> Result<(), CommandError> {
    let date = parse_date(date)?;
    let store = Arc::new(PgStore::new(connect().await?));
    let booking = BookingService::new(store, SlotCache::new(SlotCacheConfig::default()));

    let slots = booking.availability(barber, service, date).await?;
    if slots.is_empty() {
        tracing::warn!(%barber, %service, %date, "No free slots");
        return Ok(());
    }

    #[allow(clippy::print_stdout)]
    {
        for slot in &slots {
            println!("{}-{}", slot.start.format("%H:%M"), slot.end.format("%H:%M"));
        }
    }
    Ok(())
}
