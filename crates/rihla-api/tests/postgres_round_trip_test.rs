//! End-to-end round trip against PostgreSQL.
//!
//! Needs a database reachable through `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use rihla_core::repository::EventRepository;
use rihla_event_store::pg_event_repository::PgEventRepository;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_submit_confirm_round_trip(pool: PgPool) {
    let repo: Arc<dyn EventRepository> = Arc::new(PgEventRepository::new(pool));
    let client_id = common::register_client(&repo, "Rabat").await;
    let id = common::submit_reservation(&repo, client_id, &common::hotel_draft()).await;

    let (status, json) = common::post_json(
        common::build_test_app(repo.clone()),
        "/api/v1/reservations/confirm",
        &common::agency_in("Rabat"),
        &json!({ "reservationId": id, "expectedVersion": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], 2);

    let (status, view) = common::get_json(
        common::build_test_app(repo),
        &format!("/api/v1/reservations/{id}"),
        &common::client(client_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "confirmed");
    assert_eq!(view["version"], 2);
}
