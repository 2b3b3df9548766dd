//! Routes for agency reports.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rihla_core::command::Command;
use rihla_messaging::application::command_handlers;
use rihla_messaging::application::query_handlers::{self, ReportView};
use rihla_messaging::domain::commands;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::CommandResponse;
use crate::actor::Actor;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Request body for POST /submit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    /// Report id; generated when absent.
    #[serde(default)]
    pub report_id: Option<Uuid>,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
}

/// POST /submit
#[instrument(skip(state, actor, request))]
async fn submit_report(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<SubmitReportRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SubmitReport {
        correlation_id: Uuid::new_v4(),
        actor,
        report_id: request.report_id.unwrap_or_else(Uuid::new_v4),
        title: request.title,
        content: request.content,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling command"
    );

    let result = command_handlers::handle_submit_report(
        &command,
        state.clock.as_ref(),
        state.event_repository.as_ref(),
    )
    .await?;

    Ok(Json(CommandResponse::new(
        result.aggregate_id,
        &result.stored_events,
    )))
}

/// GET /
#[instrument(skip(state, actor))]
async fn list_reports(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<ReportView>>, ApiError> {
    let reports = query_handlers::list_reports(&actor, state.event_repository.as_ref()).await?;
    Ok(Json(reports))
}

/// GET /{id}
#[instrument(skip(state, actor))]
async fn get_report(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportView>, ApiError> {
    let report = query_handlers::get_report(&actor, id, state.event_repository.as_ref()).await?;
    Ok(Json(report))
}

/// Returns the router for agency reports.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports))
        .route("/submit", post(submit_report))
        .route("/{id}", get(get_report))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use rihla_core::actor::ActorContext;
    use rihla_test_support::InMemoryEventRepository;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{app_state_with, get, post};

    fn agency_in(city: &str) -> ActorContext {
        ActorContext::Agency {
            agency_id: Uuid::new_v4(),
            city: city.into(),
        }
    }

    #[tokio::test]
    async fn test_report_is_visible_to_author_and_admin_only() {
        // Arrange
        let state = app_state_with(Arc::new(InMemoryEventRepository::new()));
        let author = agency_in("Rabat");
        let (status, submitted) = post(
            router().with_state(state.clone()),
            "/submit",
            Some(&author),
            &json!({ "title": "Q1", "content": "Forty pilgrims served" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = submitted["id"].as_str().unwrap().to_owned();
        let admin = ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        };

        // Act
        let (author_status, _) =
            get(router().with_state(state.clone()), &format!("/{id}"), Some(&author)).await;
        let (admin_status, _) =
            get(router().with_state(state.clone()), &format!("/{id}"), Some(&admin)).await;
        let (rival_status, _) = get(
            router().with_state(state.clone()),
            &format!("/{id}"),
            Some(&agency_in("Rabat")),
        )
        .await;
        let (_, rival_list) = get(router().with_state(state), "/", Some(&agency_in("Fes"))).await;

        // Assert
        assert_eq!(author_status, StatusCode::OK);
        assert_eq!(admin_status, StatusCode::OK);
        assert_eq!(rival_status, StatusCode::FORBIDDEN);
        assert!(rival_list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_cannot_submit_report() {
        let state = app_state_with(Arc::new(InMemoryEventRepository::new()));
        let client = ActorContext::Client {
            client_id: Uuid::new_v4(),
        };

        let (status, _) = post(
            router().with_state(state),
            "/submit",
            Some(&client),
            &json!({ "title": "Q1", "content": "..." }),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
