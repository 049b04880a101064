//! Conflict checking: filtering candidate slots and validating booking requests.

use chrono::{NaiveDate, NaiveTime};

use super::calendar::{check_day, effective_window};
use super::model::{Appointment, Barber, Service, ShopConfig, Slot};
use crate::error::Rejection;
use crate::types::{AppointmentId, Interval};

/// Candidates that do not overlap a non-cancelled appointment of the same barber and date.
///
/// Order of `candidates` is preserved.
#[must_use]
pub fn available_slots(candidates: &[Slot], existing: &[Appointment]) -> Vec<Slot> {
    candidates
        .iter()
        .filter(|slot| {
            let interval = slot.interval();
            !existing.iter().any(|appointment| {
                appointment.occupies(slot.barber_id, slot.date)
                    && appointment.interval().overlaps(&interval)
            })
        })
        .copied()
        .collect()
}

/// A booking to validate.
#[derive(Debug, Clone, Copy)]
pub struct BookingRequest<'a> {
    pub barber: &'a Barber,
    pub service: &'a Service,
    pub config: &'a ShopConfig,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Appointment ignored by the overlap check, used when editing it.
    pub exclude: Option<AppointmentId>,
}

impl BookingRequest<'_> {
    /// The requested `[time, time + duration)` interval.
    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::starting_at(self.time, self.service.duration_minutes)
    }
}

/// First non-cancelled appointment in `existing` that overlaps the request.
#[must_use]
pub fn find_overlap<'a>(
    request: &BookingRequest<'_>,
    existing: &'a [Appointment],
) -> Option<&'a Appointment> {
    let interval = request.interval();
    existing.iter().find(|appointment| {
        Some(appointment.id) != request.exclude
            && appointment.occupies(request.barber.id, request.date)
            && appointment.interval().overlaps(&interval)
    })
}

/// Check a booking request against the calendar, the working window and
/// existing appointments.
///
/// Checks run in a fixed order and the first failure is reported:
/// 1. shop closed or barber off that day
/// 2. interval outside the effective window, or inside the break
/// 3. overlap with a non-cancelled appointment
/// 4. service not offered by this barber
///
/// # Errors
///
/// Returns the [`Rejection`] of the first failed check.
pub fn validate_booking(
    request: &BookingRequest<'_>,
    existing: &[Appointment],
) -> Result<(), Rejection> {
    check_day(request.config, request.barber, request.date)?;

    let interval = request.interval();
    let inside = effective_window(request.config, request.barber)
        .is_some_and(|window| window.interval().contains(&interval));
    if !inside {
        return Err(Rejection::OutsideWorkingHours { time: request.time });
    }
    if request.barber.in_break(&interval) {
        return Err(Rejection::DuringBreak { time: request.time });
    }

    if let Some(appointment) = find_overlap(request, existing) {
        return Err(Rejection::Overlap {
            appointment: Some(appointment.id),
        });
    }

    if !request.service.is_offered_by(request.barber.id) {
        return Err(Rejection::ServiceNotOffered);
    }
    Ok(())
}

/// Returns `true` if any two non-cancelled appointments of the same barber and
/// date overlap.
#[must_use]
pub fn has_double_booking(appointments: &[Appointment]) -> bool {
    appointments.iter().enumerate().any(|(i, a)| {
        appointments[i + 1..].iter().any(|b| {
            a.status.blocks_slot()
                && b.occupies(a.barber_id, a.date)
                && a.interval().overlaps(&b.interval())
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::schedule::model::BlockedDate;
    use crate::schedule::slots::generate_slots;
    use crate::types::{
        AppointmentStatus, BarberId, Phone, Price, RecordStatus, ServiceId, TimeWindow, WorkDays,
    };

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 23).unwrap()
    }

    fn barber() -> Barber {
        Barber {
            id: BarberId::new(1),
            name: "Carlos Silva".to_string(),
            specialty: None,
            status: RecordStatus::Active,
            working_days: WorkDays::MON_TO_SAT,
            hours: TimeWindow::parse("09:00", "19:00").unwrap(),
            break_window: Some(TimeWindow::parse("12:00", "13:00").unwrap()),
        }
    }

    fn service() -> Service {
        Service {
            id: ServiceId::new(1),
            name: "Corte Masculino".to_string(),
            description: None,
            duration_minutes: 30,
            price: Price::from_amount(Decimal::new(45, 0)).unwrap(),
            status: RecordStatus::Active,
            barber_id: None,
        }
    }

    fn config() -> ShopConfig {
        ShopConfig {
            active_days: WorkDays::MON_TO_SAT,
            hours: TimeWindow::parse("08:00", "20:00").unwrap(),
            buffer_minutes: 0,
            blocked_dates: vec![BlockedDate {
                date: NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(),
                reason: "Natal".to_string(),
            }],
        }
    }

    fn booked(id: i32, time: &str, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: AppointmentId::new(id),
            client_name: "João Pedro".to_string(),
            client_phone: Phone::parse("(11) 99999-1111").unwrap(),
            service_id: ServiceId::new(1),
            barber_id: BarberId::new(1),
            date: monday(),
            time: t(time),
            duration_minutes: 30,
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn request<'a>(
        barber: &'a Barber,
        service: &'a Service,
        config: &'a ShopConfig,
        date: NaiveDate,
        time: &str,
    ) -> BookingRequest<'a> {
        BookingRequest {
            barber,
            service,
            config,
            date,
            time: t(time),
            exclude: None,
        }
    }

    #[test]
    fn test_overlap_and_touching() {
        let (barber, service, config) = (barber(), service(), config());
        let existing = [booked(7, "09:00", AppointmentStatus::Confirmed)];

        let overlapping = request(&barber, &service, &config, monday(), "09:15");
        assert_eq!(
            validate_booking(&overlapping, &existing),
            Err(Rejection::Overlap {
                appointment: Some(AppointmentId::new(7))
            })
        );

        let touching = request(&barber, &service, &config, monday(), "09:30");
        assert_eq!(validate_booking(&touching, &existing), Ok(()));
    }

    #[test]
    fn test_blocked_date_rejected_as_closed() {
        let (barber, service, config) = (barber(), service(), config());
        let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let req = request(&barber, &service, &config, christmas, "10:00");
        let err = validate_booking(&req, &[]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Closed);
    }

    #[test]
    fn test_out_of_hours_and_break() {
        let (barber, service, config) = (barber(), service(), config());
        let early = request(&barber, &service, &config, monday(), "08:30");
        assert_eq!(
            validate_booking(&early, &[]),
            Err(Rejection::OutsideWorkingHours { time: t("08:30") })
        );

        let late = request(&barber, &service, &config, monday(), "18:45");
        assert!(matches!(
            validate_booking(&late, &[]),
            Err(Rejection::OutsideWorkingHours { .. })
        ));

        let lunch = request(&barber, &service, &config, monday(), "11:45");
        assert_eq!(
            validate_booking(&lunch, &[]),
            Err(Rejection::DuringBreak { time: t("11:45") })
        );
    }

    #[test]
    fn test_rejection_priority() {
        let (barber, config) = (barber(), config());
        let mut restricted = service();
        restricted.barber_id = Some(BarberId::new(2));
        let existing = [booked(1, "10:00", AppointmentStatus::Pending)];

        // overlap is reported before the service restriction
        let req = request(&barber, &restricted, &config, monday(), "10:00");
        assert!(matches!(
            validate_booking(&req, &existing),
            Err(Rejection::Overlap { .. })
        ));

        let req = request(&barber, &restricted, &config, monday(), "10:30");
        assert_eq!(
            validate_booking(&req, &existing),
            Err(Rejection::ServiceNotOffered)
        );

        // a closed day outranks everything
        let sunday = NaiveDate::from_ymd_opt(2024, 12, 22).unwrap();
        let req = request(&barber, &restricted, &config, sunday, "06:00");
        assert!(matches!(
            validate_booking(&req, &existing),
            Err(Rejection::ShopClosed { .. })
        ));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let (barber, service, config) = (barber(), service(), config());
        let existing = [booked(1, "10:00", AppointmentStatus::Confirmed)];
        for time in ["09:00", "10:15", "12:00", "20:00"] {
            let req = request(&barber, &service, &config, monday(), time);
            assert_eq!(
                validate_booking(&req, &existing),
                validate_booking(&req, &existing)
            );
        }
    }

    #[test]
    fn test_cancelled_frees_the_slot() {
        let (barber, service, config) = (barber(), service(), config());
        let mut existing = [booked(1, "10:00", AppointmentStatus::Confirmed)];
        let req = request(&barber, &service, &config, monday(), "10:00");
        assert!(validate_booking(&req, &existing).is_err());

        existing[0].status = AppointmentStatus::Cancelled;
        assert_eq!(validate_booking(&req, &existing), Ok(()));
    }

    #[test]
    fn test_excluded_appointment_is_ignored() {
        let (barber, service, config) = (barber(), service(), config());
        let existing = [booked(4, "10:00", AppointmentStatus::Confirmed)];
        let mut req = request(&barber, &service, &config, monday(), "10:15");
        req.exclude = Some(AppointmentId::new(4));
        assert_eq!(validate_booking(&req, &existing), Ok(()));
    }

    #[test]
    fn test_other_barbers_do_not_conflict() {
        let (barber, service, config) = (barber(), service(), config());
        let mut other = booked(1, "10:00", AppointmentStatus::Confirmed);
        other.barber_id = BarberId::new(2);
        let req = request(&barber, &service, &config, monday(), "10:00");
        assert_eq!(validate_booking(&req, &[other]), Ok(()));
    }

    #[test]
    fn test_available_slots_removes_booked() {
        let (barber, service, config) = (barber(), service(), config());
        let candidates = generate_slots(&barber, &service, monday(), &config);
        let existing = [
            booked(1, "09:00", AppointmentStatus::Confirmed),
            booked(2, "09:45", AppointmentStatus::Pending),
            booked(3, "10:30", AppointmentStatus::Cancelled),
        ];
        let free = available_slots(&candidates, &existing);
        let starts: Vec<_> = free.iter().map(|slot| slot.start).collect();

        assert!(!starts.contains(&t("09:00")));
        // 09:45-10:15 blocks both 09:30 and 10:00
        assert!(!starts.contains(&t("09:30")));
        assert!(!starts.contains(&t("10:00")));
        assert!(starts.contains(&t("10:30")));
        assert_eq!(free.len(), candidates.len() - 3);
    }

    #[test]
    fn test_has_double_booking() {
        let a = booked(1, "09:00", AppointmentStatus::Confirmed);
        let b = booked(2, "09:30", AppointmentStatus::Confirmed);
        assert!(!has_double_booking(&[a.clone(), b]));

        let c = booked(3, "09:15", AppointmentStatus::Pending);
        assert!(has_double_booking(&[a.clone(), c.clone()]));

        let mut cancelled = c;
        cancelled.status = AppointmentStatus::Cancelled;
        assert!(!has_double_booking(&[a, cancelled]));
    }
}
