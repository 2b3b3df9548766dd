//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rihla_api::app;
use rihla_api::state::AppState;
use rihla_core::actor::ActorContext;
use rihla_core::repository::EventRepository;
use rihla_reservation::domain::lifecycle::LifecyclePolicy;
use rihla_test_support::{FixedClock, InMemoryEventRepository};
use tower::ServiceExt;
use uuid::Uuid;

/// Build the full app router over `repository` with a fixed clock. Uses the
/// same route tree as `main.rs`.
pub fn build_test_app(repository: Arc<dyn EventRepository>) -> Router {
    build_test_app_with_policy(repository, LifecyclePolicy::default())
}

/// Build the full app router with a custom lifecycle policy.
pub fn build_test_app_with_policy(
    repository: Arc<dyn EventRepository>,
    policy: LifecyclePolicy,
) -> Router {
    let state = AppState::new(Arc::new(FixedClock::standard()), repository, policy, 5);
    app(state)
}

/// A fresh in-memory store shared by every request of one test.
pub fn in_memory() -> Arc<dyn EventRepository> {
    Arc::new(InMemoryEventRepository::new())
}

pub fn admin() -> ActorContext {
    ActorContext::Admin {
        admin_id: Uuid::new_v4(),
    }
}

pub fn client(client_id: Uuid) -> ActorContext {
    ActorContext::Client { client_id }
}

pub fn agency_in(city: &str) -> ActorContext {
    ActorContext::Agency {
        agency_id: Uuid::new_v4(),
        city: city.into(),
    }
}

fn with_actor(
    mut builder: axum::http::request::Builder,
    actor: &ActorContext,
) -> axum::http::request::Builder {
    builder = builder
        .header("x-actor-id", actor.actor_id().to_string())
        .header("x-actor-role", actor.role().as_str());
    if let ActorContext::Agency { city, .. } = actor {
        builder = builder.header("x-agency-city", city.as_str());
    }
    builder
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request as `actor` with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    actor: &ActorContext,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = with_actor(Request::builder().method("POST").uri(uri), actor)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request as `actor` and return the response.
pub async fn get_json(
    app: Router,
    uri: &str,
    actor: &ActorContext,
) -> (StatusCode, serde_json::Value) {
    let request = with_actor(Request::builder().method("GET").uri(uri), actor)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Registers a client living in `city` and returns its id.
pub async fn register_client(repository: &Arc<dyn EventRepository>, city: &str) -> Uuid {
    let client_id = Uuid::new_v4();
    let (status, _) = post_json(
        build_test_app(repository.clone()),
        "/api/v1/clients/register",
        &client(client_id),
        &serde_json::json!({
            "fullName": "Test Client",
            "email": "client@example.com",
            "city": city
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    client_id
}

/// A complete hotel draft; hotel packages have no departure city.
pub fn hotel_draft() -> serde_json::Value {
    serde_json::json!({
        "packageType": "hotel",
        "destination": "Istanbul",
        "dateFrom": "2025-03-01",
        "dateTo": "2025-03-10",
        "rooms": "1",
        "travelerName": "Ahmed",
        "travelerPhone": "0600000000",
        "birthDate": "1990-01-01",
        "passportNumber": "X1",
        "passportExpiry": "2030-01-01",
        "address": "12 Rue Yougoslavie, Marrakech",
        "emergencyContact": "Fatima 0611111111"
    })
}

/// Submits `draft` as `client_id` and returns the reservation id.
pub async fn submit_reservation(
    repository: &Arc<dyn EventRepository>,
    client_id: Uuid,
    draft: &serde_json::Value,
) -> Uuid {
    let (status, json) = post_json(
        build_test_app(repository.clone()),
        "/api/v1/reservations/submit",
        &client(client_id),
        draft,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "submit failed: {json}");
    Uuid::parse_str(json["id"].as_str().unwrap()).unwrap()
}
