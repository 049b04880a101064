//! Calendar rules: which days the shop opens and which days a barber works.

use chrono::NaiveDate;

use super::model::{Barber, ShopConfig};
use crate::error::{BookingError, Rejection};
use crate::types::{TimeWindow, parse_date};

/// Returns `true` if the shop opens on `date`.
///
/// The weekday must be active and the date must not be blocked.
#[must_use]
pub fn is_open(config: &ShopConfig, date: NaiveDate) -> bool {
    config.active_days.contains_date(date) && config.blocked(date).is_none()
}

/// [`is_open`] for a `YYYY-MM-DD` string.
///
/// # Errors
///
/// Returns [`BookingError::InvalidInput`] if the date is malformed.
pub fn is_open_on(config: &ShopConfig, date: &str) -> Result<bool, BookingError> {
    Ok(is_open(config, parse_date(date)?))
}

/// Reason the date is blocked, if it is.
#[must_use]
pub fn blocked_reason(config: &ShopConfig, date: NaiveDate) -> Option<&str> {
    config.blocked(date).map(|blocked| blocked.reason.as_str())
}

/// Returns `true` if the barber is active and works on the weekday of `date`.
#[must_use]
pub fn is_barber_working(barber: &Barber, date: NaiveDate) -> bool {
    barber.is_active() && barber.working_days.contains_date(date)
}

/// Check that both the shop and the barber operate on `date`.
///
/// # Errors
///
/// [`Rejection::ShopClosed`] when the shop is closed (naming the holiday for
/// blocked dates), otherwise [`Rejection::BarberOff`] when the barber is off.
pub fn check_day(config: &ShopConfig, barber: &Barber, date: NaiveDate) -> Result<(), Rejection> {
    if !is_open(config, date) {
        return Err(Rejection::ShopClosed {
            date,
            reason: blocked_reason(config, date).map(ToString::to_string),
        });
    }
    if !is_barber_working(barber, date) {
        return Err(Rejection::BarberOff { date });
    }
    Ok(())
}

/// Barber hours intersected with shop hours; `None` if they do not meet.
#[must_use]
pub fn effective_window(config: &ShopConfig, barber: &Barber) -> Option<TimeWindow> {
    barber.hours.intersect(&config.hours)
}
