//! Slot generation.
//!
//! Slots start at the beginning of the effective window (barber hours intersected
//! with shop hours) and advance by `duration + buffer` minutes. A slot that
//! touches the break is skipped but the grid keeps its step, so the first slot
//! after a break may start later than the break's end.

use chrono::NaiveDate;

use super::calendar::{effective_window, is_barber_working, is_open};
use super::model::{Barber, Service, ShopConfig, Slot};
use crate::types::Interval;
use crate::types::clock::time_at;

/// Candidate slots for `service` with `barber` on `date`, ascending by start.
///
/// Returns an empty list when the shop is closed, the barber is not working,
/// or the barber does not offer the service.
#[must_use]
pub fn generate_slots(
    barber: &Barber,
    service: &Service,
    date: NaiveDate,
    config: &ShopConfig,
) -> Vec<Slot> {
    if !is_open(config, date)
        || !is_barber_working(barber, date)
        || !service.is_offered_by(barber.id)
        || service.duration_minutes == 0
    {
        return Vec::new();
    }
    let Some(window) = effective_window(config, barber) else {
        return Vec::new();
    };

    let window = window.interval();
    let step = service.duration_minutes + config.buffer_minutes;
    let mut slots = Vec::new();
    let mut start = window.start;

    while start + service.duration_minutes <= window.end {
        let interval = Interval::new(start, start + service.duration_minutes);
        if !barber.in_break(&interval) {
            if let (Some(start), Some(end)) = (time_at(interval.start), time_at(interval.end)) {
                slots.push(Slot {
                    barber_id: barber.id,
                    date,
                    start,
                    end,
                });
            }
        }
        start += step;
    }
    slots
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveTime;
    use rust_decimal::Decimal;

    use super::*;
    use crate::schedule::model::BlockedDate;
    use crate::types::{BarberId, Price, RecordStatus, ServiceId, TimeWindow, WorkDays};

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

    fn service(minutes: u32) -> Service {
        Service {
            id: ServiceId::new(1),
            name: "Corte Masculino".to_string(),
            description: None,
            duration_minutes: minutes,
            price: Price::from_amount(Decimal::new(45, 0)).unwrap(),
            status: RecordStatus::Active,
            barber_id: None,
        }
    }

    fn config(buffer: u32) -> ShopConfig {
        ShopConfig {
            active_days: WorkDays::MON_TO_SAT,
            hours: TimeWindow::parse("08:00", "20:00").unwrap(),
            buffer_minutes: buffer,
            blocked_dates: vec![BlockedDate {
                date: NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(),
                reason: "Natal".to_string(),
            }],
        }
    }

    fn starts(slots: &[Slot]) -> Vec<NaiveTime> {
        slots.iter().map(|slot| slot.start).collect()
    }

    #[test]
    fn test_break_is_skipped() {
        let slots = generate_slots(&barber(), &service(30), monday(), &config(0));
        let starts = starts(&slots);

        assert!(starts.contains(&t("11:30")));
        assert!(starts.contains(&t("13:00")));
        assert!(!starts.contains(&t("12:00")));
        assert!(!starts.contains(&t("12:30")));
        assert_eq!(starts.first(), Some(&t("09:00")));
        assert_eq!(starts.last(), Some(&t("18:30")));
        // 09:00..12:00 and 13:00..19:00 in 30 minute steps
        assert_eq!(slots.len(), 6 + 12);
    }

    #[test]
    fn test_every_slot_has_service_length() {
        for minutes in [15, 20, 30, 40, 50] {
            let slots = generate_slots(&barber(), &service(minutes), monday(), &config(15));
            assert!(!slots.is_empty());
            assert!(slots.iter().all(|slot| slot.duration_minutes() == minutes));
            assert!(slots.iter().all(|slot| slot.end <= t("19:00")));
        }
    }

    #[test]
    fn test_consecutive_slots_step_by_duration_plus_buffer() {
        let slots = generate_slots(&barber(), &service(30), monday(), &config(15));
        for pair in slots.windows(2) {
            let gap = pair[1].interval().start - pair[0].interval().start;
            // a break can swallow whole steps but never shifts the grid
            assert_eq!(gap % 45, 0);
            assert!(pair[0].start < pair[1].start);
        }
        assert_eq!(starts(&slots)[..4], [t("09:00"), t("09:45"), t("10:30"), t("11:15")]);
        // 12:00 and 12:45 touch the break, 13:30 is the next grid point
        assert_eq!(starts(&slots)[4], t("13:30"));
    }

    #[test]
    fn test_window_is_clipped_to_shop_hours() {
        let mut shop = config(0);
        shop.hours = TimeWindow::parse("10:00", "18:00").unwrap();
        let slots = generate_slots(&barber(), &service(30), monday(), &shop);
        assert_eq!(slots.first().map(|s| s.start), Some(t("10:00")));
        assert_eq!(slots.last().map(|s| s.end), Some(t("18:00")));
    }

    #[test]
    fn test_no_slots_when_not_working() {
        // Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 12, 22).unwrap();
        assert!(generate_slots(&barber(), &service(30), sunday, &config(0)).is_empty());

        let mut inactive = barber();
        inactive.status = RecordStatus::Inactive;
        assert!(generate_slots(&inactive, &service(30), monday(), &config(0)).is_empty());
    }

    #[test]
    fn test_no_slots_on_blocked_date() {
        let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert!(generate_slots(&barber(), &service(30), christmas, &config(0)).is_empty());
    }

    #[test]
    fn test_no_slots_for_service_restricted_elsewhere() {
        let mut restricted = service(40);
        restricted.barber_id = Some(BarberId::new(2));
        assert!(generate_slots(&barber(), &restricted, monday(), &config(0)).is_empty());

        restricted.barber_id = Some(BarberId::new(1));
        assert!(!generate_slots(&barber(), &restricted, monday(), &config(0)).is_empty());
    }

    #[test]
    fn test_service_longer_than_window() {
        let slots = generate_slots(&barber(), &service(11 * 60), monday(), &config(0));
        assert!(slots.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let first = generate_slots(&barber(), &service(30), monday(), &config(15));
        let second = generate_slots(&barber(), &service(30), monday(), &config(15));
        assert_eq!(first, second);
    }
}
