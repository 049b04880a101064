//! Availability route handler.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use royal_barber_core::schedule::Slot;
use royal_barber_core::types::{BarberId, ServiceId, parse_date};

use crate::{db::BookingStore, error::AppError, state::AppState};

/// Build the availability router.
pub fn router<S: BookingStore>() -> Router<AppState<S>> {
    Router::new().route("/api/availability", get(show::<S>))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub barber_id: BarberId,
    pub service_id: ServiceId,
    /// `YYYY-MM-DD`.
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub barber_id: BarberId,
    pub service_id: ServiceId,
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

/// Free slots for a barber, service and date.
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed query, `NotFound` if the barber or
/// service does not exist.
pub async fn show<S: BookingStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let Query(query) = query?;
    let date = parse_date(&query.date)?;
    let slots = state
        .booking()
        .availability(query.barber_id, query.service_id, date)
        .await?;

    Ok(Json(AvailabilityResponse {
        barber_id: query.barber_id,
        service_id: query.service_id,
        date,
        slots,
    }))
}
