//! The admin API served over a real socket.

#![allow(clippy::unwrap_used)]

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use royal_barber_integration_tests::TestServer;

#[tokio::test]
async fn test_health_is_public() {
    let server = TestServer::spawn().await;

    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = server
        .client
        .get(server.url("/api/appointments"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_book_reschedule_and_list() {
    let server = TestServer::spawn().await;

    let resp = server
        .request(Method::POST, "/api/appointments")
        .json(&json!({
            "client_name": "Ana Lima",
            "client_phone": "11912345678",
            "service_id": 2,
            "barber_id": 3,
            "date": "2025-03-12",
            "time": "08:00",
            "notes": "Primeira vez",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["time"], "08:00");

    // Onto Roberto's 16:00 haircut.
    let resp = server
        .request(Method::PATCH, &format!("/api/appointments/{id}"))
        .json(&json!({"time": "16:10"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "conflict");

    let resp = server
        .request(Method::PATCH, &format!("/api/appointments/{id}"))
        .json(&json!({"time": "08:30", "notes": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let moved: Value = resp.json().await.unwrap();
    assert_eq!(moved["time"], "08:30");
    assert_eq!(moved["notes"], Value::Null);

    let resp = server
        .request(Method::GET, "/api/appointments?barber_id=3&date=2025-03-12")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(listed.len(), 2);
    // Most recently booked first, whatever the slot.
    assert_eq!(listed[0]["id"].as_i64(), Some(id));
    assert_eq!(listed[1]["time"], "16:00");
}

#[tokio::test]
async fn test_cancel_then_rebook_same_slot() {
    let server = TestServer::spawn().await;

    let book = json!({
        "client_name": "Ana Lima",
        "client_phone": "(11) 91234-5678",
        "service_id": 1,
        "barber_id": 1,
        "date": "2025-03-12",
        "time": "16:30",
    });
    let first: Value = server
        .request(Method::POST, "/api/appointments")
        .json(&book)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let resp = server
        .request(Method::POST, "/api/appointments")
        .json(&book)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = server
        .request(Method::POST, &format!("/api/appointments/{}/status", first["id"]))
        .json(&json!({"status": "cancelled"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = server
        .request(Method::POST, "/api/appointments")
        .json(&book)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_service_crud_and_unknown_barber() {
    let server = TestServer::spawn().await;

    let resp = server
        .request(Method::POST, "/api/services")
        .json(&json!({
            "name": "Relaxamento",
            "duration_minutes": 45,
            "price": {"amount": "80.00", "currency_code": "BRL"},
            "barber_id": 99,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .request(Method::POST, "/api/services")
        .json(&json!({
            "name": "Relaxamento",
            "duration_minutes": 45,
            "price": {"amount": "80.00", "currency_code": "BRL"},
            "barber_id": 2,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let service: Value = resp.json().await.unwrap();

    // Restricted to Marcos.
    let resp = server
        .request(Method::POST, "/api/appointments")
        .json(&json!({
            "client_name": "Ana Lima",
            "client_phone": "(11) 91234-5678",
            "service_id": service["id"],
            "barber_id": 1,
            "date": "2025-03-12",
            "time": "17:00",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = server
        .request(Method::DELETE, &format!("/api/services/{}", service["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
