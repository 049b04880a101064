//! Dashboard route handler.

use axum::{Json, Router, extract::State, routing::get};

use royal_barber_core::stats::DashboardSnapshot;

use crate::{db::BookingStore, error::AppError, state::AppState};

/// Build the dashboard router.
pub fn router<S: BookingStore>() -> Router<AppState<S>> {
    Router::new().route("/api/dashboard", get(show::<S>))
}

/// Current dashboard snapshot.
///
/// # Errors
///
/// Returns an error if the snapshot has to be recomputed and the store fails.
pub async fn show<S: BookingStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    Ok(Json(state.booking().dashboard().await?))
}
