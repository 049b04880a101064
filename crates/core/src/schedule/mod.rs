//! The availability and booking-conflict engine.
//!
//! Everything here is pure: callers load barbers, services, shop configuration
//! and existing appointments, and these functions decide which slots are free
//! and whether a booking may proceed.

pub mod calendar;
pub mod conflict;
pub mod model;
pub mod slots;

pub use calendar::{blocked_reason, check_day, effective_window, is_barber_working, is_open};
pub use conflict::{
    BookingRequest, available_slots, find_overlap, has_double_booking, validate_booking,
};
pub use model::{
    Appointment, Barber, BarberProfile, BlockedDate, MAX_NAME_LENGTH, Service, ServiceProfile,
    ShopConfig, Slot,
};
pub use slots::generate_slots;
