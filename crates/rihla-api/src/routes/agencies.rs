//! Routes for agency directory records.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rihla_core::command::Command;
use rihla_directory::application::command_handlers;
use rihla_directory::application::query_handlers::AgencyView;
use rihla_directory::domain::commands;
use rihla_visibility::queries;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::CommandResponse;
use crate::actor::Actor;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Request body for POST /register.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAgencyRequest {
    /// Agency id; generated when absent.
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    /// Trading name.
    pub name: String,
    /// City the agency operates in.
    pub city: String,
}

/// POST /register
#[instrument(skip(state, actor, request))]
async fn register_agency(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<RegisterAgencyRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RegisterAgency {
        correlation_id: Uuid::new_v4(),
        actor,
        agency_id: request.agency_id.unwrap_or_else(Uuid::new_v4),
        name: request.name,
        city: request.city,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling command"
    );

    let result = command_handlers::handle_register_agency(
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
async fn list_agencies(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<AgencyView>>, ApiError> {
    let agencies = queries::visible_agencies(&actor, state.event_repository.as_ref()).await?;
    Ok(Json(agencies))
}

/// GET /{id}
#[instrument(skip(state, actor))]
async fn get_agency(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<AgencyView>, ApiError> {
    let agency = queries::get_visible_agency(&actor, id, state.event_repository.as_ref()).await?;
    Ok(Json(agency))
}

/// Returns the router for agency records.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_agencies))
        .route("/register", post(register_agency))
        .route("/{id}", get(get_agency))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use rihla_core::actor::ActorContext;
    use rihla_test_support::{EmptyEventRepository, InMemoryEventRepository};
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{app_state_with, get, post};

    #[tokio::test]
    async fn test_admin_registers_agency() {
        let app = router().with_state(app_state_with(Arc::new(EmptyEventRepository)));
        let admin = ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        };

        let (status, json) = post(
            app,
            "/register",
            Some(&admin),
            &json!({ "name": "Atlas Voyages", "city": "Rabat" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["eventIds"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_agency_cannot_register_agency() {
        let app = router().with_state(app_state_with(Arc::new(EmptyEventRepository)));
        let agency = ActorContext::Agency {
            agency_id: Uuid::new_v4(),
            city: "Rabat".into(),
        };

        let (status, _) = post(
            app,
            "/register",
            Some(&agency),
            &json!({ "name": "Rival", "city": "Rabat" }),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_agency_sees_only_itself_and_clients_see_nothing() {
        // Arrange
        let state = app_state_with(Arc::new(InMemoryEventRepository::new()));
        let admin = ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        };
        let own_id = Uuid::new_v4();
        for (id, name) in [(own_id, "Atlas Voyages"), (Uuid::new_v4(), "Sahara Tours")] {
            post(
                router().with_state(state.clone()),
                "/register",
                Some(&admin),
                &json!({ "agencyId": id, "name": name, "city": "Rabat" }),
            )
            .await;
        }
        let agency = ActorContext::Agency {
            agency_id: own_id,
            city: "Rabat".into(),
        };
        let client = ActorContext::Client {
            client_id: Uuid::new_v4(),
        };

        // Act
        let (_, admin_list) = get(router().with_state(state.clone()), "/", Some(&admin)).await;
        let (_, agency_list) = get(router().with_state(state.clone()), "/", Some(&agency)).await;
        let (client_status, _) = get(router().with_state(state), "/", Some(&client)).await;

        // Assert
        assert_eq!(admin_list.as_array().unwrap().len(), 2);
        assert_eq!(agency_list.as_array().unwrap().len(), 1);
        assert_eq!(agency_list[0]["name"], "Atlas Voyages");
        assert_eq!(client_status, StatusCode::FORBIDDEN);
    }
}
