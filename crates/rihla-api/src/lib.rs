//! Rihla API — HTTP binding for the reservation engine.

pub mod actor;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;

use crate::state::AppState;

/// Builds the full route tree over `state`. Middleware layers are added by
/// the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/reservations", routes::reservations::router())
        .nest("/api/v1/clients", routes::clients::router())
        .nest("/api/v1/agencies", routes::agencies::router())
        .nest("/api/v1/notifications", routes::notifications::router())
        .nest("/api/v1/reports", routes::reports::router())
        .nest("/api/v1/dashboard", routes::dashboard::router())
        .with_state(state)
}
