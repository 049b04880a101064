//! Service catalog route handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};

use royal_barber_core::schedule::{Service, ServiceProfile};
use royal_barber_core::types::ServiceId;

use super::barbers::ListQuery;
use crate::{db::BookingStore, error::AppError, state::AppState};

/// Build the services router.
pub fn router<S: BookingStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/services", get(index::<S>).post(create::<S>))
        .route(
            "/api/services/{id}",
            get(show::<S>).put(update::<S>).delete(destroy::<S>),
        )
}

/// List services.
///
/// # Errors
///
/// Returns an error if the query string is malformed or the store fails.
pub async fn index<S: BookingStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Service>>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.booking().list_services(query.active).await?))
}

/// Create a service.
///
/// # Errors
///
/// Returns an error if the body is invalid, the restricted barber does not
/// exist, or the store fails.
pub async fn create<S: BookingStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<ServiceProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    let Json(profile) = body?;
    let service = state.booking().create_service(profile).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// Get a service.
///
/// # Errors
///
/// Returns `NotFound` if the service does not exist.
pub async fn show<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<ServiceId>, PathRejection>,
) -> Result<Json<Service>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.booking().service(id).await?))
}

/// Replace a service.
///
/// # Errors
///
/// Returns an error if the body is invalid or the service does not exist.
pub async fn update<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<ServiceId>, PathRejection>,
    body: Result<Json<ServiceProfile>, JsonRejection>,
) -> Result<Json<Service>, AppError> {
    let Path(id) = id?;
    let Json(profile) = body?;
    Ok(Json(state.booking().update_service(id, profile).await?))
}

/// Delete a service.
///
/// # Errors
///
/// Returns `NotFound` if the service does not exist, `Conflict` if it is still referenced.
pub async fn destroy<S: BookingStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<ServiceId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.booking().delete_service(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
