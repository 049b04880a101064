//! Business logic services for admin.
//!
//! # Services
//!
//! - `booking` - Appointments, catalog CRUD, availability and the dashboard snapshot
//! - `availability` - `moka` cache of candidate slots
//! - `locks` - Per-(barber, date) booking exclusion

pub mod availability;
pub mod booking;
pub mod locks;

pub use availability::SlotCache;
pub use booking::{AppointmentChanges, BookingService, NewAppointment};
pub use locks::{BookingLocks, DayGuard};
