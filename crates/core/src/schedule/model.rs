//! Barbershop entities: barbers, services, appointments, shop configuration and slots.
//!
//! `*Profile` types are the editable part of an entity (what an admin submits);
//! the entity itself adds the identifier assigned by the store.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::types::clock::{Interval, hhmm, minutes_of, time_at};
use crate::types::{
    AppointmentId, AppointmentStatus, BarberId, Phone, Price, RecordStatus, ServiceId, TimeWindow,
    WorkDays,
};

/// Longest accepted name, matching the `VARCHAR(100)` columns.
pub const MAX_NAME_LENGTH: usize = 100;

/// Longest accepted service, in minutes.
pub const MAX_SERVICE_MINUTES: u32 = 8 * 60;

/// Longest accepted buffer between appointments, in minutes.
pub const MAX_BUFFER_MINUTES: u32 = 4 * 60;

fn validate_name(field: &str, value: &str) -> Result<(), BookingError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::InvalidInput(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(BookingError::InvalidInput(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

// =============================================================================
// Barber
// =============================================================================

/// Editable barber fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarberProfile {
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
    /// Weekdays the barber works, 0 = Sunday.
    pub working_days: WorkDays,
    /// Working hours.
    pub hours: TimeWindow,
    /// Optional break, always inside `hours`.
    #[serde(default)]
    pub break_window: Option<TimeWindow>,
}

impl BarberProfile {
    /// Check the barber invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInput`] for an empty name or a break that
    /// does not lie within working hours.
    pub fn validate(&self) -> Result<(), BookingError> {
        validate_name("barber name", &self.name)?;
        if let Some(brk) = self
            .break_window
            .filter(|brk| !self.hours.contains_window(brk))
        {
            return Err(BookingError::InvalidInput(format!(
                "break {}-{} must lie within working hours {}-{}",
                brk.start().format("%H:%M"),
                brk.end().format("%H:%M"),
                self.hours.start().format("%H:%M"),
                self.hours.end().format("%H:%M"),
            )));
        }
        Ok(())
    }

    /// Attach a store-assigned identifier.
    #[must_use]
    pub fn into_barber(self, id: BarberId) -> Barber {
        Barber {
            id,
            name: self.name,
            specialty: self.specialty,
            status: self.status,
            working_days: self.working_days,
            hours: self.hours,
            break_window: self.break_window,
        }
    }
}

/// A barber and their weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barber {
    pub id: BarberId,
    pub name: String,
    pub specialty: Option<String>,
    pub status: RecordStatus,
    pub working_days: WorkDays,
    pub hours: TimeWindow,
    pub break_window: Option<TimeWindow>,
}

impl Barber {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns `true` if `interval` intersects the break.
    #[must_use]
    pub fn in_break(&self, interval: &Interval) -> bool {
        self.break_window
            .is_some_and(|brk| brk.interval().overlaps(interval))
    }
}

// =============================================================================
// Service
// =============================================================================

/// Editable service fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProfile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Duration in minutes, greater than zero.
    pub duration_minutes: u32,
    pub price: Price,
    #[serde(default)]
    pub status: RecordStatus,
    /// `None` means every barber offers the service.
    #[serde(default)]
    pub barber_id: Option<BarberId>,
}

impl ServiceProfile {
    /// Check the service invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInput`] for an empty name or a duration
    /// outside `1..=480` minutes.
    pub fn validate(&self) -> Result<(), BookingError> {
        validate_name("service name", &self.name)?;
        if self.duration_minutes == 0 || self.duration_minutes > MAX_SERVICE_MINUTES {
            return Err(BookingError::InvalidInput(format!(
                "service duration must be between 1 and {MAX_SERVICE_MINUTES} minutes"
            )));
        }
        Ok(())
    }

    /// Attach a store-assigned identifier.
    #[must_use]
    pub fn into_service(self, id: ServiceId) -> Service {
        Service {
            id,
            name: self.name,
            description: self.description,
            duration_minutes: self.duration_minutes,
            price: self.price,
            status: self.status,
            barber_id: self.barber_id,
        }
    }
}

/// A bookable service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub price: Price,
    pub status: RecordStatus,
    pub barber_id: Option<BarberId>,
}

impl Service {
    /// Whether `barber` can be booked for this service.
    ///
    /// Inactive services are offered by nobody; restricted services only by
    /// their barber.
    #[must_use]
    pub fn is_offered_by(&self, barber: BarberId) -> bool {
        self.status.is_active() && self.barber_id.is_none_or(|only| only == barber)
    }
}

// =============================================================================
// Shop configuration
// =============================================================================

/// A day the shop is closed regardless of weekday rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockedDate {
    pub date: NaiveDate,
    pub reason: String,
}

/// Business-wide operating rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Weekdays the shop opens, 0 = Sunday.
    pub active_days: WorkDays,
    /// Opening and closing time.
    pub hours: TimeWindow,
    /// Idle minutes inserted between consecutive slots.
    #[serde(default)]
    pub buffer_minutes: u32,
    /// Closed days, ascending by date.
    #[serde(default)]
    pub blocked_dates: Vec<BlockedDate>,
}

impl ShopConfig {
    /// Check the configuration and put blocked dates in canonical order.
    ///
    /// Blocked dates are sorted ascending; a repeated date keeps its first reason.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInput`] for an oversized buffer or an
    /// empty blocked-date reason.
    pub fn normalized(mut self) -> Result<Self, BookingError> {
        if self.buffer_minutes > MAX_BUFFER_MINUTES {
            return Err(BookingError::InvalidInput(format!(
                "buffer must be at most {MAX_BUFFER_MINUTES} minutes"
            )));
        }
        for blocked in &mut self.blocked_dates {
            blocked.reason = blocked.reason.trim().to_string();
            if blocked.reason.is_empty() {
                return Err(BookingError::InvalidInput(format!(
                    "blocked date {} needs a reason",
                    blocked.date
                )));
            }
        }
        self.blocked_dates.sort_by_key(|blocked| blocked.date);
        self.blocked_dates.dedup_by_key(|blocked| blocked.date);
        Ok(self)
    }

    /// The blocked-date entry for `date`, if any.
    #[must_use]
    pub fn blocked(&self, date: NaiveDate) -> Option<&BlockedDate> {
        self.blocked_dates.iter().find(|blocked| blocked.date == date)
    }
}

// =============================================================================
// Appointment
// =============================================================================

/// A booked appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub client_name: String,
    pub client_phone: Phone,
    pub service_id: ServiceId,
    pub barber_id: BarberId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    /// Service duration captured when the appointment was booked.
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// The occupied `[time, time + duration)` interval.
    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::starting_at(self.time, self.duration_minutes)
    }

    /// End time of the appointment, `None` if it would run past midnight.
    #[must_use]
    pub fn end_time(&self) -> Option<NaiveTime> {
        time_at(self.interval().end)
    }

    /// Returns `true` if this appointment still holds its slot for `barber` on `date`.
    #[must_use]
    pub fn occupies(&self, barber: BarberId, date: NaiveDate) -> bool {
        self.barber_id == barber && self.date == date && self.status.blocks_slot()
    }
}

// =============================================================================
// Slot
// =============================================================================

/// A candidate `[start, end)` interval for one barber on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub barber_id: BarberId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Slot {
    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::new(minutes_of(self.start), minutes_of(self.end))
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.interval().len()
    }
}
