//! Royal Barber Core - Shared types and scheduling engine.
//!
//! This crate provides the types and pure logic used across all Royal Barber components:
//! - `admin` - Administration service (barbers, services, bookings, dashboard)
//! - `cli` - Command-line tools for migrations, seeding and availability checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database access,
//! no clocks. Every function here is deterministic for identical inputs, which keeps the
//! availability rules testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, phones, weekdays and statuses
//! - [`schedule`] - Calendar rules, slot generation and booking-conflict checks
//! - [`stats`] - Dashboard aggregates over appointments
//! - [`error`] - Error kinds shared by the engine and the admin service

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod schedule;
pub mod stats;
pub mod types;

pub use error::{BookingError, ErrorKind, Rejection};
pub use types::*;
