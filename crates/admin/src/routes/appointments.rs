//! Appointment route handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use royal_barber_core::schedule::Appointment;
use royal_barber_core::types::{AppointmentId, AppointmentStatus, parse_date};

use crate::{
    db::{AppointmentFilter, BookingStore},
    error::AppError,
    services::{AppointmentChanges, NewAppointment},
    state::AppState,
};

/// Build the appointments router.
pub fn router<S: BookingStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/appointments", get(index::<S>).post(create::<S>))
        .route("/api/appointments/{id}", get(show::<S>).patch(update::<S>))
        .route("/api/appointments/{id}/status", post(change_status::<S>))
        .route("/api/schedule/{date}", get(schedule::<S>))
}

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: AppointmentStatus,
}

/// List appointments, most recently created first.
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed filter.
pub async fn index<S: BookingStore>(
    State(state): State<AppState<S>>,
    filter: Result<Query<AppointmentFilter>, QueryRejection>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let Query(filter) = filter?;
    Ok(Json(state.booking().list_appointments(&filter).await?))
}

/// Book an appointment.
///
/// # Errors
///
/// Returns the booking error kind when validation refuses the request.
pub async fn create<S: BookingStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<NewAppointment>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let Json(input) = body?;
    let appointment = state.booking().create_appointment(input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Get an appointment.
///
/// # Errors
///
/// Returns `NotFound` if the appointment does not exist.
pub async fn show<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<AppointmentId>, PathRejection>,
) -> Result<Json<Appointment>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.booking().appointment(id).await?))
}

/// Edit or reschedule an appointment.
///
/// # Errors
///
/// Returns `InvalidTransition` for terminal appointments, otherwise the
/// booking error kind when validation refuses the change.
pub async fn update<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<AppointmentId>, PathRejection>,
    body: Result<Json<AppointmentChanges>, JsonRejection>,
) -> Result<Json<Appointment>, AppError> {
    let Path(id) = id?;
    let Json(changes) = body?;
    Ok(Json(state.booking().edit_appointment(id, changes).await?))
}

/// Apply a status transition.
///
/// # Errors
///
/// Returns `InvalidTransition` if the edge is not allowed.
pub async fn change_status<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<AppointmentId>, PathRejection>,
    body: Result<Json<StatusChange>, JsonRejection>,
) -> Result<Json<Appointment>, AppError> {
    let Path(id) = id?;
    let Json(change) = body?;
    Ok(Json(state.booking().transition(id, change.status).await?))
}

/// Every appointment of a day, ordered by time.
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed date.
pub async fn schedule<S: BookingStore>(
    State(state): State<AppState<S>>,
    date: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let Path(date) = date?;
    let date = parse_date(&date)?;
    Ok(Json(state.booking().day_schedule(date).await?))
}
