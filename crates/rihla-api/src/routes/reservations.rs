//! Routes for the Reservation bounded context.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rihla_core::command::Command;
use rihla_reservation::application::command_handlers;
use rihla_reservation::application::query_handlers::{DocumentStatusView, ReservationView};
use rihla_reservation::domain::commands;
use rihla_reservation::domain::documents::DocumentUpload;
use rihla_reservation::domain::draft::ReservationDraft;
use rihla_visibility::access::CityScopedAccess;
use rihla_visibility::queries;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::CommandResponse;
use crate::actor::Actor;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Request body for POST /submit: the draft fields plus an optional id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReservationRequest {
    /// Identifier to assign; generated when absent.
    #[serde(default)]
    pub reservation_id: Option<Uuid>,
    /// The unvalidated draft.
    #[serde(flatten)]
    pub draft: ReservationDraft,
}

/// Request body for POST /confirm.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmReservationRequest {
    /// The reservation to confirm.
    pub reservation_id: Uuid,
    /// Version the caller last read.
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Request body for POST /cancel.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservationRequest {
    /// The reservation to cancel.
    pub reservation_id: Uuid,
    /// Optional free-text reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Version the caller last read.
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Request body for POST /upload-document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentRequest {
    /// The reservation receiving the document.
    pub reservation_id: Uuid,
    /// Slot key: photo, identity, vaccination or passport.
    pub slot: String,
    /// File metadata.
    #[serde(flatten)]
    pub upload: DocumentUpload,
}

/// POST /submit
#[instrument(skip(state, actor, request))]
async fn submit_reservation(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<SubmitReservationRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SubmitReservation {
        correlation_id: Uuid::new_v4(),
        actor,
        reservation_id: request.reservation_id.unwrap_or_else(Uuid::new_v4),
        draft: request.draft,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling command"
    );

    let result = command_handlers::handle_submit_reservation(
        &command,
        state.clock.as_ref(),
        state.event_repository.as_ref(),
    )
    .await?;

    Ok(Json(
        CommandResponse::new(result.aggregate_id, &result.stored_events)
            .with_version(result.version),
    ))
}

/// POST /confirm
#[instrument(skip(state, actor, request), fields(reservation_id = %request.reservation_id))]
async fn confirm_reservation(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<ConfirmReservationRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ConfirmReservation {
        correlation_id: Uuid::new_v4(),
        actor,
        reservation_id: request.reservation_id,
        expected_version: request.expected_version,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling command"
    );

    let repo = state.event_repository.as_ref();
    let result = command_handlers::handle_confirm_reservation(
        &command,
        &state.policy,
        state.clock.as_ref(),
        &CityScopedAccess::new(repo),
        repo,
    )
    .await?;

    Ok(Json(
        CommandResponse::new(result.aggregate_id, &result.stored_events)
            .with_version(result.version),
    ))
}

/// POST /cancel
#[instrument(skip(state, actor, request), fields(reservation_id = %request.reservation_id))]
async fn cancel_reservation(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<CancelReservationRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CancelReservation {
        correlation_id: Uuid::new_v4(),
        actor,
        reservation_id: request.reservation_id,
        reason: request.reason,
        expected_version: request.expected_version,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling command"
    );

    let repo = state.event_repository.as_ref();
    let result = command_handlers::handle_cancel_reservation(
        &command,
        state.clock.as_ref(),
        &CityScopedAccess::new(repo),
        repo,
    )
    .await?;

    Ok(Json(
        CommandResponse::new(result.aggregate_id, &result.stored_events)
            .with_version(result.version),
    ))
}

/// POST /upload-document
#[instrument(skip(state, actor, request), fields(reservation_id = %request.reservation_id, slot = %request.slot))]
async fn upload_document(
    State(state): State<AppState>,
    Actor(actor): Actor,
    JsonBody(request): JsonBody<UploadDocumentRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::UploadDocument {
        correlation_id: Uuid::new_v4(),
        actor,
        reservation_id: request.reservation_id,
        slot: request.slot,
        upload: request.upload,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command_type(),
        "handling command"
    );

    let repo = state.event_repository.as_ref();
    let result = command_handlers::handle_upload_document(
        &command,
        state.clock.as_ref(),
        &CityScopedAccess::new(repo),
        repo,
    )
    .await?;

    Ok(Json(
        CommandResponse::new(result.aggregate_id, &result.stored_events)
            .with_version(result.version),
    ))
}

/// GET /
#[instrument(skip(state, actor))]
async fn list_reservations(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<ReservationView>>, ApiError> {
    let reservations =
        queries::visible_reservations(&actor, state.event_repository.as_ref()).await?;
    Ok(Json(reservations))
}

/// GET /{id}
#[instrument(skip(state, actor))]
async fn get_reservation(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationView>, ApiError> {
    let reservation =
        queries::get_visible_reservation(&actor, id, state.event_repository.as_ref()).await?;
    Ok(Json(reservation))
}

/// GET /{id}/documents
#[instrument(skip(state, actor))]
async fn get_document_status(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentStatusView>, ApiError> {
    let status =
        queries::get_visible_document_status(&actor, id, state.event_repository.as_ref()).await?;
    Ok(Json(status))
}

/// Returns the router for the reservation context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reservations))
        .route("/submit", post(submit_reservation))
        .route("/confirm", post(confirm_reservation))
        .route("/cancel", post(cancel_reservation))
        .route("/upload-document", post(upload_document))
        .route("/{id}", get(get_reservation))
        .route("/{id}/documents", get(get_document_status))
}
