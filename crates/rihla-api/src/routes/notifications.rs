//! Routes for notification fan-out.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rihla_core::command::Command;
use rihla_messaging::application::command_handlers;
use rihla_messaging::application::query_handlers::{self, NotificationView};
use rihla_messaging::domain::commands;
use rihla_messaging::domain::events::RecipientType;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::CommandResponse;
use crate::actor::Actor;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Request body for POST /send.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// `all` or `specific`.
    pub recipient_type: RecipientType,
    /// Recipients for `specific`; ignored for `all`.
    #[serde(default)]
    pub recipient_user_ids: Vec<Uuid>,
}

/// POST /send
#[instrument(skip(state, actor, request), fields(recipient_type = ?request.recipient_type))]
async fn send_notification(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<SendNotificationRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SendNotification {
        correlation_id: Uuid::new_v4(),
        actor,
        notification_id: Uuid::new_v4(),
        title: request.title,
        content: request.content,
        recipient_type: request.recipient_type,
        recipient_user_ids: request.recipient_user_ids,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling command"
    );

    let result = command_handlers::handle_send_notification(
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
async fn list_notifications(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<NotificationView>>, ApiError> {
    let notifications =
        query_handlers::list_notifications(&actor, state.event_repository.as_ref()).await?;
    Ok(Json(notifications))
}

/// GET /feed/{client_id}
#[instrument(skip(state, actor))]
async fn get_feed(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Vec<NotificationView>>, ApiError> {
    let feed =
        query_handlers::get_feed(&actor, client_id, state.event_repository.as_ref()).await?;
    Ok(Json(feed))
}

/// Returns the router for notifications.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/send", post(send_notification))
        .route("/feed/{client_id}", get(get_feed))
}
