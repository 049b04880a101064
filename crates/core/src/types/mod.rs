//! Core types for Royal Barber.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod clock;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;
pub mod weekdays;

pub use clock::{Interval, TimeWindow, parse_date, parse_time};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::{CurrencyCode, Price};
pub use status::*;
pub use weekdays::WorkDays;
