//! Error kinds for scheduling and booking.
//!
//! Every failure is recoverable and names a specific [`ErrorKind`] so callers can
//! turn it into a user-facing message. Booking validation failures carry a
//! [`Rejection`] describing exactly why the request was refused.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;

use crate::types::{AppointmentId, AppointmentStatus};

/// The category of a booking failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed date, time, duration or other input.
    InvalidInput,
    /// Shop or barber not operating on that date.
    Closed,
    /// Requested interval outside the working window or inside the break.
    OutOfHours,
    /// Overlaps an existing booking, or the barber does not offer the service.
    Conflict,
    /// Status change not in the transition table.
    InvalidTransition,
    /// Referenced barber, service or appointment does not exist.
    NotFound,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Closed => "closed",
            Self::OutOfHours => "out_of_hours",
            Self::Conflict => "conflict",
            Self::InvalidTransition => "invalid_transition",
            Self::NotFound => "not_found",
        }
    }
}

/// Why a booking request was refused.
///
/// Variants are listed in the order validation checks them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Rejection {
    /// The shop is closed that day (inactive weekday or blocked date).
    #[error("the shop is closed on {date}{}", holiday_suffix(.reason))]
    ShopClosed {
        date: NaiveDate,
        reason: Option<String>,
    },
    /// The barber is inactive or does not work that weekday.
    #[error("the barber does not work on {date}")]
    BarberOff { date: NaiveDate },
    /// The interval starts before opening or ends after closing.
    #[error("{} is outside working hours", hhmm(.time))]
    OutsideWorkingHours { time: NaiveTime },
    /// The interval intersects the barber's break.
    #[error("{} falls in the barber's break", hhmm(.time))]
    DuringBreak { time: NaiveTime },
    /// The interval overlaps a non-cancelled appointment.
    #[error("the requested time overlaps another booking{}", overlap_suffix(.appointment))]
    Overlap { appointment: Option<AppointmentId> },
    /// The service is inactive or restricted to another barber.
    #[error("this barber does not offer the requested service")]
    ServiceNotOffered,
}

fn holiday_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

fn overlap_suffix(appointment: &Option<AppointmentId>) -> String {
    appointment
        .map(|id| format!(" (#{id})"))
        .unwrap_or_default()
}

fn hhmm(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

impl Rejection {
    /// Error kind reported to callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ShopClosed { .. } | Self::BarberOff { .. } => ErrorKind::Closed,
            Self::OutsideWorkingHours { .. } | Self::DuringBreak { .. } => ErrorKind::OutOfHours,
            Self::Overlap { .. } | Self::ServiceNotOffered => ErrorKind::Conflict,
        }
    }
}

/// Errors returned by the scheduling engine and the booking service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// Malformed input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Booking validation refused the request.
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// Status change outside the transition table.
    #[error("cannot change status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    /// Appointment is terminal and can no longer be edited.
    #[error("appointment is {0} and can no longer be changed")]
    Terminal(AppointmentStatus),

    /// Referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Entity is still referenced and cannot be removed.
    #[error("{entity} {id} is still referenced and cannot be deleted")]
    InUse { entity: &'static str, id: i32 },
}

impl BookingError {
    /// Error kind reported to callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Rejected(rejection) => rejection.kind(),
            Self::InvalidTransition { .. } | Self::Terminal(_) => ErrorKind::InvalidTransition,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InUse { .. } => ErrorKind::Conflict,
        }
    }

    /// Overlap detected after validation passed (the store refused the write).
    #[must_use]
    pub const fn overlap() -> Self {
        Self::Rejected(Rejection::Overlap { appointment: None })
    }

    #[must_use]
    pub const fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}
