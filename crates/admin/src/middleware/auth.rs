//! Authentication extractor for the admin API.
//!
//! Every `/api/*` route requires `Authorization: Bearer <ADMIN_API_TOKEN>`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::db::BookingStore;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires the admin API token.
///
/// Applied to the whole API router as a route layer, or per handler:
///
/// ```rust,ignore
/// async fn protected_handler(_: RequireAdmin) -> &'static str {
///     "ok"
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl<S: BookingStore> FromRequestParts<AppState<S>> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        if state.token_matches(token) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected request with invalid API token");
            Err(AppError::Unauthorized("invalid API token".to_string()))
        }
    }
}
