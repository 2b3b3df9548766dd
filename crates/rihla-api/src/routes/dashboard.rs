//! Dashboard endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use rihla_dashboard::stats::{DashboardView, compute_dashboard};
use tracing::instrument;

use crate::actor::Actor;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /
#[instrument(skip(state, actor))]
async fn get_dashboard(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<DashboardView>, ApiError> {
    let dashboard =
        compute_dashboard(&actor, state.recent_limit, state.event_repository.as_ref()).await?;
    Ok(Json(dashboard))
}

/// Returns the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}
