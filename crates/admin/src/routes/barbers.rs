//! Barber route handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use royal_barber_core::schedule::{Barber, BarberProfile};
use royal_barber_core::types::BarberId;

use crate::{db::BookingStore, error::AppError, state::AppState};

/// Build the barbers router.
pub fn router<S: BookingStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/barbers", get(index::<S>).post(create::<S>))
        .route(
            "/api/barbers/{id}",
            get(show::<S>).put(update::<S>).delete(destroy::<S>),
        )
}

/// Query for catalog listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Only active entries.
    #[serde(default)]
    pub active: bool,
}

/// List barbers.
///
/// # Errors
///
/// Returns an error if the query string is malformed or the store fails.
pub async fn index<S: BookingStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Barber>>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.booking().list_barbers(query.active).await?))
}

/// Create a barber.
///
/// # Errors
///
/// Returns an error if the body is invalid or the store fails.
pub async fn create<S: BookingStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<BarberProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<Barber>), AppError> {
    let Json(profile) = body?;
    let barber = state.booking().create_barber(profile).await?;
    Ok((StatusCode::CREATED, Json(barber)))
}

/// Get a barber.
///
/// # Errors
///
/// Returns `NotFound` if the barber does not exist.
pub async fn show<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<BarberId>, PathRejection>,
) -> Result<Json<Barber>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.booking().barber(id).await?))
}

/// Replace a barber.
///
/// # Errors
///
/// Returns an error if the body is invalid or the barber does not exist.
pub async fn update<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<BarberId>, PathRejection>,
    body: Result<Json<BarberProfile>, JsonRejection>,
) -> Result<Json<Barber>, AppError> {
    let Path(id) = id?;
    let Json(profile) = body?;
    Ok(Json(state.booking().update_barber(id, profile).await?))
}

/// Delete a barber.
///
/// # Errors
///
/// Returns `NotFound` if the barber does not exist, `Conflict` if it is still referenced.
pub async fn destroy<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<BarberId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.booking().delete_barber(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
