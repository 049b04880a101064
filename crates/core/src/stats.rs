//! Dashboard aggregates computed from appointments.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::schedule::{Appointment, Barber, Service};
use crate::types::{AppointmentStatus, BarberId, ServiceId};

/// Number of services listed in [`DashboardSnapshot::top_services`].
pub const TOP_SERVICES: usize = 3;

/// Appointment counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub completed: usize,
}

impl StatusCounts {
    fn add(&mut self, status: AppointmentStatus) {
        self.total += 1;
        match status {
            AppointmentStatus::Pending => self.pending += 1,
            AppointmentStatus::Confirmed => self.confirmed += 1,
            AppointmentStatus::Cancelled => self.cancelled += 1,
            AppointmentStatus::Completed => self.completed += 1,
        }
    }
}

/// How many appointments reference one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDemand {
    pub service_id: ServiceId,
    /// `None` if the service no longer exists.
    pub name: Option<String>,
    pub count: usize,
}

/// How many appointments reference one barber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarberDemand {
    pub barber_id: BarberId,
    pub name: Option<String>,
    pub count: usize,
}

/// Summary statistics for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub today: NaiveDate,
    /// Sunday of the week containing `today`.
    pub week_start: NaiveDate,
    /// Saturday of the week containing `today`.
    pub week_end: NaiveDate,
    pub today_counts: StatusCounts,
    pub week_counts: StatusCounts,
    pub all_counts: StatusCounts,
    /// Price of today's confirmed appointments.
    pub revenue_today: Decimal,
    /// Price of this week's confirmed appointments.
    pub revenue_week: Decimal,
    /// Descending by count, ties by ascending id.
    pub service_demand: Vec<ServiceDemand>,
    /// Descending by count, ties by ascending id.
    pub barber_demand: Vec<BarberDemand>,
    pub top_services: Vec<ServiceDemand>,
    pub top_barber: Option<BarberDemand>,
    /// Cancelled share of all appointments, in percent with one decimal.
    pub cancellation_rate: Decimal,
}

/// Sunday-to-Saturday week containing `date`.
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    let start = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(date);
    (start, end)
}

/// Compute the dashboard snapshot.
///
/// Revenue uses the current price of each service; appointments whose service
/// has been removed contribute nothing.
#[must_use]
pub fn compute(
    appointments: &[Appointment],
    services: &[Service],
    barbers: &[Barber],
    today: NaiveDate,
) -> DashboardSnapshot {
    let (week_start, week_end) = week_bounds(today);
    let prices: HashMap<ServiceId, Decimal> = services
        .iter()
        .map(|service| (service.id, service.price.amount()))
        .collect();

    let mut today_counts = StatusCounts::default();
    let mut week_counts = StatusCounts::default();
    let mut all_counts = StatusCounts::default();
    let mut revenue_today = Decimal::ZERO;
    let mut revenue_week = Decimal::ZERO;
    let mut by_service: HashMap<ServiceId, usize> = HashMap::new();
    let mut by_barber: HashMap<BarberId, usize> = HashMap::new();

    for appointment in appointments {
        let price = if appointment.status == AppointmentStatus::Confirmed {
            prices
                .get(&appointment.service_id)
                .copied()
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        all_counts.add(appointment.status);
        if appointment.date == today {
            today_counts.add(appointment.status);
            revenue_today += price;
        }
        if (week_start..=week_end).contains(&appointment.date) {
            week_counts.add(appointment.status);
            revenue_week += price;
        }
        *by_service.entry(appointment.service_id).or_default() += 1;
        *by_barber.entry(appointment.barber_id).or_default() += 1;
    }

    let service_demand: Vec<ServiceDemand> = ranked(by_service)
        .into_iter()
        .map(|(service_id, count)| ServiceDemand {
            service_id,
            name: services
                .iter()
                .find(|service| service.id == service_id)
                .map(|service| service.name.clone()),
            count,
        })
        .collect();

    let barber_demand: Vec<BarberDemand> = ranked(by_barber)
        .into_iter()
        .map(|(barber_id, count)| BarberDemand {
            barber_id,
            name: barbers
                .iter()
                .find(|barber| barber.id == barber_id)
                .map(|barber| barber.name.clone()),
            count,
        })
        .collect();

    DashboardSnapshot {
        today,
        week_start,
        week_end,
        today_counts,
        week_counts,
        all_counts,
        revenue_today,
        revenue_week,
        top_services: service_demand.iter().take(TOP_SERVICES).cloned().collect(),
        top_barber: barber_demand.first().cloned(),
        service_demand,
        barber_demand,
        cancellation_rate: cancellation_rate(&all_counts),
    }
}

fn ranked<K: Ord + Copy>(counts: HashMap<K, usize>) -> Vec<(K, usize)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| b.cmp(a).then(a_id.cmp(b_id)));
    ranked
}

fn cancellation_rate(counts: &StatusCounts) -> Decimal {
    if counts.total == 0 {
        return Decimal::ZERO;
    }
    let rate = Decimal::from(counts.cancelled) * Decimal::ONE_HUNDRED / Decimal::from(counts.total);
    rate.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}
