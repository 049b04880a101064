//! Shop configuration route handlers.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::get,
};

use royal_barber_core::schedule::ShopConfig;

use crate::{db::BookingStore, error::AppError, state::AppState};

/// Build the settings router.
pub fn router<S: BookingStore>() -> Router<AppState<S>> {
    Router::new().route("/api/settings", get(show::<S>).put(update::<S>))
}

/// Current shop configuration.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn show<S: BookingStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<ShopConfig>, AppError> {
    Ok(Json(state.booking().shop_config().await?))
}

/// Replace the shop configuration and return it in canonical form.
///
/// # Errors
///
/// Returns `InvalidInput` if the configuration is invalid.
pub async fn update<S: BookingStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<ShopConfig>, JsonRejection>,
) -> Result<Json<ShopConfig>, AppError> {
    let Json(config) = body?;
    Ok(Json(state.booking().update_shop_config(config).await?))
}
