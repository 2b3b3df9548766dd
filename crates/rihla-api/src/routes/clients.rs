//! Routes for client directory records.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rihla_core::actor::ActorContext;
use rihla_core::command::Command;
use rihla_directory::application::command_handlers;
use rihla_directory::application::query_handlers::ClientView;
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
pub struct RegisterClientRequest {
    /// Client id; defaults to the caller's own id for client actors.
    #[serde(default)]
    pub client_id: Option<Uuid>,
    /// Full name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Home city.
    pub city: String,
    /// Agency the client signed up through.
    #[serde(default)]
    pub agency_id: Option<Uuid>,
}

/// Request body for POST /change-city.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeClientCityRequest {
    /// The client moving.
    pub client_id: Uuid,
    /// The new city.
    pub city: String,
}

/// POST /register
#[instrument(skip(state, actor, request))]
async fn register_client(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<RegisterClientRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let client_id = request.client_id.unwrap_or_else(|| match &actor {
        ActorContext::Client { client_id } => *client_id,
        ActorContext::Agency { .. } | ActorContext::Admin { .. } => Uuid::new_v4(),
    });
    let command = commands::RegisterClient {
        correlation_id: Uuid::new_v4(),
        actor,
        client_id,
        full_name: request.full_name,
        email: request.email,
        city: request.city,
        agency_id: request.agency_id,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        %client_id,
        "handling command"
    );

    let result = command_handlers::handle_register_client(
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

/// POST /change-city
#[instrument(skip(state, actor, request), fields(client_id = %request.client_id))]
async fn change_client_city(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<ChangeClientCityRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ChangeClientCity {
        correlation_id: Uuid::new_v4(),
        actor,
        client_id: request.client_id,
        city: request.city,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling command"
    );

    let result = command_handlers::handle_change_client_city(
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
async fn list_clients(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<ClientView>>, ApiError> {
    let clients = queries::visible_clients(&actor, state.event_repository.as_ref()).await?;
    Ok(Json(clients))
}

/// GET /{id}
#[instrument(skip(state, actor))]
async fn get_client(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientView>, ApiError> {
    let client = queries::get_visible_client(&actor, id, state.event_repository.as_ref()).await?;
    Ok(Json(client))
}

/// Returns the router for client records.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients))
        .route("/register", post(register_client))
        .route("/change-city", post(change_client_city))
        .route("/{id}", get(get_client))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use rihla_test_support::InMemoryEventRepository;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{app_state_with, get, post};

    fn registration(city: &str) -> serde_json::Value {
        json!({
            "fullName": "Yassine Alaoui",
            "email": "yassine@example.com",
            "city": city
        })
    }

    #[tokio::test]
    async fn test_client_self_registration_uses_own_id() {
        // Arrange
        let state = app_state_with(Arc::new(InMemoryEventRepository::new()));
        let client_id = Uuid::new_v4();
        let actor = ActorContext::Client { client_id };

        // Act
        let (status, json) = post(
            router().with_state(state),
            "/register",
            Some(&actor),
            &registration("Fes"),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], client_id.to_string());
        assert_eq!(json["eventIds"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_city_returns_400_naming_city() {
        let state = app_state_with(Arc::new(InMemoryEventRepository::new()));
        let actor = ActorContext::Client {
            client_id: Uuid::new_v4(),
        };

        let (status, json) = post(
            router().with_state(state),
            "/register",
            Some(&actor),
            &registration("  "),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["fields"], json!(["city"]));
    }

    #[tokio::test]
    async fn test_agency_reads_same_city_client_but_not_other_city() {
        // Arrange
        let state = app_state_with(Arc::new(InMemoryEventRepository::new()));
        let admin = ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        };
        let (_, rabat) = post(
            router().with_state(state.clone()),
            "/register",
            Some(&admin),
            &registration("Rabat"),
        )
        .await;
        let (_, casablanca) = post(
            router().with_state(state.clone()),
            "/register",
            Some(&admin),
            &registration("Casablanca"),
        )
        .await;
        let agency = ActorContext::Agency {
            agency_id: Uuid::new_v4(),
            city: "Rabat".into(),
        };

        // Act
        let (list_status, list) = get(router().with_state(state.clone()), "/", Some(&agency)).await;
        let (own_status, _) = get(
            router().with_state(state.clone()),
            &format!("/{}", rabat["id"].as_str().unwrap()),
            Some(&agency),
        )
        .await;
        let (other_status, other) = get(
            router().with_state(state),
            &format!("/{}", casablanca["id"].as_str().unwrap()),
            Some(&agency),
        )
        .await;

        // Assert
        assert_eq!(list_status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["city"], "Rabat");
        assert_eq!(own_status, StatusCode::OK);
        assert_eq!(other_status, StatusCode::FORBIDDEN);
        assert_eq!(other["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_change_city_of_unknown_client_returns_404() {
        let state = app_state_with(Arc::new(InMemoryEventRepository::new()));
        let admin = ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        };

        let (status, _) = post(
            router().with_state(state),
            "/change-city",
            Some(&admin),
            &json!({ "clientId": Uuid::new_v4(), "city": "Rabat" }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
