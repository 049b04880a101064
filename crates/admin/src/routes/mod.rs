//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Liveness
//! GET    /health/ready                   - Store connectivity
//!
//! # Dashboard
//! GET    /api/dashboard                  - Aggregate snapshot
//!
//! # Barbers
//! GET    /api/barbers                    - List (?active=true)
//! POST   /api/barbers                    - Create
//! GET    /api/barbers/{id}               - Read
//! PUT    /api/barbers/{id}               - Replace
//! DELETE /api/barbers/{id}               - Delete (409 if referenced)
//!
//! # Services
//! GET    /api/services                   - List (?active=true)
//! POST   /api/services                   - Create
//! GET    /api/services/{id}              - Read
//! PUT    /api/services/{id}              - Replace
//! DELETE /api/services/{id}              - Delete (409 if referenced)
//!
//! # Settings
//! GET    /api/settings                   - Shop configuration
//! PUT    /api/settings                   - Replace shop configuration
//!
//! # Booking
//! GET    /api/availability               - Free slots (?barber_id&service_id&date)
//! GET    /api/schedule/{date}            - All appointments of a day, by time
//! GET    /api/appointments               - List (?status&date&barber_id), newest first
//! POST   /api/appointments               - Book
//! GET    /api/appointments/{id}          - Read
//! PATCH  /api/appointments/{id}          - Edit or reschedule
//! POST   /api/appointments/{id}/status   - Status transition
//! ```
//!
//! Every `/api/*` route requires the admin bearer token.

pub mod appointments;
pub mod availability;
pub mod barbers;
pub mod dashboard;
pub mod services;
pub mod settings;

use axum::{Router, middleware::from_extractor_with_state};

use crate::db::BookingStore;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the authenticated API router.
pub fn routes<S: BookingStore>(state: AppState<S>) -> Router<AppState<S>> {
    Router::new()
        .merge(dashboard::router())
        .merge(barbers::router())
        .merge(services::router())
        .merge(settings::router())
        .merge(availability::router())
        .merge(appointments::router())
        .route_layer(from_extractor_with_state::<RequireAdmin, _>(state))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::config::AdminConfig;
    use crate::db::MemoryStore;
    use crate::seed;
    use crate::state::AppState;

    const TOKEN: &str = "k8Jq2mVx9Lr4Tn7Wp3Zs6Hd1Fb5Gc0Ye";

    async fn app() -> axum::Router {
        let store = MemoryStore::new();
        // Monday 2025-03-10 seeds bookings on Wednesday 2025-03-12.
        seed::load(&store, chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
            .await
            .unwrap();
        crate::app(AppState::new(AdminConfig::in_memory(TOKEN), store))
    }

    async fn call(
        app: &axum::Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(Request::get("/api/barbers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::get("/api/barbers")
                    .header(header::AUTHORIZATION, "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_booking_flow() {
        let app = app().await;

        // Carlos (1) is off on Sunday, free on Monday with a 15-minute buffer.
        let (status, body) = call(
            &app,
            Method::GET,
            "/api/availability?barber_id=1&service_id=4&date=2025-03-10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slots"][0]["start"], "09:00");
        assert_eq!(body["slots"][1]["start"], "09:30");

        let booking = json!({
            "client_name": "Ana Lima",
            "client_phone": "(11) 91234-5678",
            "service_id": 4,
            "barber_id": 1,
            "date": "2025-03-10",
            "time": "09:00",
        });
        let (status, created) =
            call(&app, Method::POST, "/api/appointments", Some(booking.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        assert_eq!(created["duration_minutes"], 15);

        let (status, body) = call(&app, Method::POST, "/api/appointments", Some(booking)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");

        let id = created["id"].as_i64().unwrap();
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/appointments/{id}/status"),
            Some(json!({"status": "completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "invalid_transition");

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/appointments/{id}/status"),
            Some(json!({"status": "confirmed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "confirmed");

        let (status, body) = call(&app, Method::GET, "/api/schedule/2025-03-10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_day_is_unprocessable() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/appointments",
            Some(json!({
                "client_name": "Ana Lima",
                "client_phone": "(11) 91234-5678",
                "service_id": 1,
                "barber_id": 1,
                "date": "2025-03-09",
                "time": "10:00",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "closed");
    }

    #[tokio::test]
    async fn test_malformed_input_is_bad_request() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::GET,
            "/api/availability?barber_id=1&service_id=1&date=10/03/2025",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/barbers",
            Some(json!({"name": "No hours"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::GET, "/api/barbers/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_catalog_listing_and_delete_in_use() {
        let app = app().await;

        let (status, body) = call(&app, Method::GET, "/api/services?active=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 6);

        let (status, body) = call(&app, Method::DELETE, "/api/barbers/1", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");

        let (status, _) = call(&app, Method::GET, "/api/barbers/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_settings_round_trip_is_normalized() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/settings",
            Some(json!({
                "active_days": [1, 2, 3, 4, 5],
                "hours": {"start": "09:00", "end": "18:00"},
                "buffer_minutes": 10,
                "blocked_dates": [
                    {"date": "2025-12-25", "reason": " Natal "},
                    {"date": "2025-01-01", "reason": "Ano Novo"},
                ],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["blocked_dates"][0]["date"], "2025-01-01");
        assert_eq!(body["blocked_dates"][1]["reason"], "Natal");

        let (status, body) = call(&app, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["all_counts"]["total"], 6);
    }
}
