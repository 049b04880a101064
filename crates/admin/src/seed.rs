//! Demo catalog and bookings for local development.
//!
//! Loaded by `rb-cli seed` into `PostgreSQL`, and into the in-memory store
//! when the server starts with `BOOKING_STORE=memory`.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use tracing::{info, warn};

use royal_barber_core::BookingError;
use royal_barber_core::schedule::{
    BarberProfile, BlockedDate, BookingRequest, ServiceProfile, ShopConfig, is_open, validate_booking,
};
use royal_barber_core::types::{
    AppointmentStatus, Phone, Price, RecordStatus, TimeWindow, WorkDays, parse_date, parse_time,
};

use crate::db::{AppointmentDraft, BookingStore};
use crate::error::AppError;

/// What [`load`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub barbers: usize,
    pub services: usize,
    pub appointments: usize,
    /// The store already had barbers, nothing was inserted.
    pub skipped: bool,
}

/// Business rules of the demo shop: Monday to Saturday, 08:00-20:00, 15-minute buffer.
///
/// # Errors
///
/// Never fails for the built-in values; the `Result` comes from the validating constructors.
pub fn shop_config() -> Result<ShopConfig, BookingError> {
    ShopConfig {
        active_days: WorkDays::MON_TO_SAT,
        hours: TimeWindow::parse("08:00", "20:00")?,
        buffer_minutes: 15,
        blocked_dates: vec![
            BlockedDate {
                date: parse_date("2024-12-25")?,
                reason: "Natal".to_string(),
            },
            BlockedDate {
                date: parse_date("2024-01-01")?,
                reason: "Ano Novo".to_string(),
            },
        ],
    }
    .normalized()
}

/// The three demo barbers.
///
/// # Errors
///
/// Never fails for the built-in values.
pub fn barbers() -> Result<Vec<BarberProfile>, BookingError> {
    let barber = |name: &str,
                  specialty: &str,
                  days: &[u8],
                  hours: (&str, &str),
                  break_window: Option<(&str, &str)>|
     -> Result<BarberProfile, BookingError> {
        Ok(BarberProfile {
            name: name.to_string(),
            specialty: Some(specialty.to_string()),
            status: RecordStatus::Active,
            working_days: WorkDays::from_days(days.iter().copied())?,
            hours: TimeWindow::parse(hours.0, hours.1)?,
            break_window: break_window
                .map(|(start, end)| TimeWindow::parse(start, end))
                .transpose()?,
        })
    };

    Ok(vec![
        barber(
            "Carlos Silva",
            "Barbeiro Master",
            &[1, 2, 3, 4, 5, 6],
            ("09:00", "19:00"),
            Some(("12:00", "13:00")),
        )?,
        barber(
            "Marcos Santos",
            "Especialista em Cortes",
            &[2, 3, 4, 5, 6],
            ("10:00", "20:00"),
            Some(("14:00", "14:30")),
        )?,
        barber(
            "Roberto Oliveira",
            "Barbeiro Sênior",
            &[1, 3, 5],
            ("08:00", "18:00"),
            None,
        )?,
    ])
}

/// The six demo services, offered by every barber.
///
/// # Errors
///
/// Never fails for the built-in values.
pub fn services() -> Result<Vec<ServiceProfile>, BookingError> {
    [
        ("Corte Masculino", "Corte de cabelo masculino moderno", 30, 45),
        ("Barba", "Aparar e modelar a barba", 20, 35),
        ("Corte + Barba", "Pacote completo", 50, 70),
        ("Sobrancelha", "Design de sobrancelha", 15, 20),
        ("Hidratação", "Tratamento hidratação capilar", 30, 40),
        ("Pigmentação", "Pigmentação de cabelo ou barba", 40, 60),
    ]
    .into_iter()
    .map(
        |(name, description, duration_minutes, price)| -> Result<ServiceProfile, BookingError> {
            Ok(ServiceProfile {
                name: name.to_string(),
                description: Some(description.to_string()),
                duration_minutes,
                price: Price::from_amount(Decimal::from(price))?,
                status: RecordStatus::Active,
                barber_id: None,
            })
        },
    )
    .collect()
}

/// Demo bookings: (client, phone, service index, barber index, time, status, notes).
const BOOKINGS: [(&str, &str, usize, usize, &str, AppointmentStatus, Option<&str>); 6] = [
    ("João Pedro", "(11) 99999-1111", 0, 0, "09:00", AppointmentStatus::Confirmed, Some("Primeira vez")),
    ("Lucas Martins", "(11) 88888-2222", 1, 0, "10:00", AppointmentStatus::Pending, None),
    ("Ricardo Souza", "(11) 77777-3333", 2, 1, "11:00", AppointmentStatus::Confirmed, None),
    ("Bruno Costa", "(11) 66666-4444", 0, 0, "14:00", AppointmentStatus::Pending, Some("Cliente vip")),
    ("Paulo Ferreira", "(11) 55555-5555", 3, 1, "15:00", AppointmentStatus::Cancelled, None),
    ("Diego Almeida", "(11) 44444-6666", 0, 2, "16:00", AppointmentStatus::Confirmed, None),
];

/// Days searched for an open Wednesday before giving up on demo bookings.
const WEDNESDAY_SEARCH_DAYS: usize = 7 * 53;

/// Insert the demo data unless the store already has barbers.
///
/// Bookings are placed on the first Wednesday on or after `day` that the
/// shop is open, so that every demo barber works that day. Each booking goes
/// through the same validation as a client booking.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn load<S: BookingStore>(store: &S, day: NaiveDate) -> Result<SeedReport, AppError> {
    if !store.list_barbers().await?.is_empty() {
        info!("Store already has barbers, skipping seed");
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let config = shop_config()?;
    store.save_shop_config(&config).await?;

    let mut team = Vec::new();
    for profile in barbers()? {
        team.push(store.create_barber(&profile).await?);
    }
    let mut catalog = Vec::new();
    for profile in services()? {
        catalog.push(store.create_service(&profile).await?);
    }

    let mut appointments = 0;
    let date = open_wednesday(&config, day);
    match date {
        Some(date) => {
            for (client, phone, service, barber, time, status, notes) in BOOKINGS {
                let (Some(service), Some(barber)) = (catalog.get(service), team.get(barber)) else {
                    continue;
                };
                let time = parse_time(time)?;
                let existing = store.appointments_for(barber.id, date).await?;
                let request = BookingRequest {
                    barber,
                    service,
                    config: &config,
                    date,
                    time,
                    exclude: None,
                };
                if let Err(rejection) = validate_booking(&request, &existing) {
                    warn!(client, %date, %time, %rejection, "Skipping demo booking");
                    continue;
                }

                let draft = AppointmentDraft {
                    client_name: client.to_string(),
                    client_phone: Phone::parse(phone)
                        .map_err(|e| BookingError::InvalidInput(e.to_string()))?,
                    service_id: service.id,
                    barber_id: barber.id,
                    date,
                    time,
                    duration_minutes: service.duration_minutes,
                    status,
                    notes: notes.map(str::to_string),
                };
                store.insert_appointment(&draft).await?;
                appointments += 1;
            }
        }
        None => warn!(%day, "No open Wednesday ahead, skipping demo bookings"),
    }

    let report = SeedReport {
        barbers: team.len(),
        services: catalog.len(),
        appointments,
        skipped: false,
    };
    info!(?report, ?date, "Seeded demo data");
    Ok(report)
}

fn open_wednesday(config: &ShopConfig, day: NaiveDate) -> Option<NaiveDate> {
    day.iter_days()
        .take(WEDNESDAY_SEARCH_DAYS)
        .find(|&d| d.weekday() == Weekday::Wed && is_open(config, d))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{AppointmentFilter, MemoryStore};

    #[test]
    fn test_open_wednesday() {
        let config = shop_config().unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        assert_eq!(open_wednesday(&config, monday), Some(wednesday));
        assert_eq!(open_wednesday(&config, wednesday), Some(wednesday));

        let closed = ShopConfig {
            active_days: WorkDays::from_days([1, 2, 4, 5, 6]).unwrap(),
            ..config
        };
        assert_eq!(open_wednesday(&closed, monday), None);
    }

    #[tokio::test]
    async fn test_bookings_skip_a_blocked_wednesday() {
        let store = MemoryStore::new();
        // Christmas 2024 is a Wednesday.
        let day = NaiveDate::from_ymd_opt(2024, 12, 23).unwrap();

        let report = load(&store, day).await.unwrap();
        assert_eq!(report.appointments, 6);

        let config = store.shop_config().await.unwrap();
        let all = store
            .list_appointments(&AppointmentFilter::default())
            .await
            .unwrap();
        let new_year = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(all.iter().all(|a| a.date == new_year));
        assert!(all.iter().all(|a| is_open(&config, a.date)));
    }

    #[tokio::test]
    async fn test_load_is_skipped_the_second_time() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let report = load(&store, day).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                barbers: 3,
                services: 6,
                appointments: 6,
                skipped: false,
            }
        );
        assert_eq!(store.shop_config().await.unwrap().buffer_minutes, 15);

        let again = load(&store, day).await.unwrap();
        assert!(again.skipped);
        let all = store
            .list_appointments(&AppointmentFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 6);
    }
}
