//! Command handlers for the Reservation context.
//!
//! Each handler loads the reservation stream, reconstitutes the aggregate,
//! runs the domain operation and appends the resulting events under the
//! version the aggregate was loaded at.

use rihla_core::actor::ActorContext;
use rihla_core::aggregate::AggregateRoot;
use rihla_core::clock::Clock;
use rihla_core::error::DomainError;
use rihla_core::event::{DomainEvent, EventMetadata};
use rihla_core::repository::{EventRepository, StoredEvent, load_stream};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::query_handlers::RESERVATION_CATEGORY;
use crate::domain::access::ReservationAccess;
use crate::domain::aggregates::Reservation;
use crate::domain::commands::{
    CancelReservation, ConfirmReservation, SubmitReservation, UploadDocument,
};
use crate::domain::documents::DocumentKind;
use crate::domain::events::{ReservationEvent, ReservationEventKind};
use crate::domain::lifecycle::LifecyclePolicy;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct ReservationCommandResult {
    /// The aggregate ID affected by the command.
    pub aggregate_id: Uuid,
    /// Version of the reservation after the command.
    pub version: i64,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

fn to_stored_event(event: &ReservationEvent) -> StoredEvent {
    let meta = event.metadata();
    StoredEvent {
        event_id: meta.event_id,
        aggregate_id: meta.aggregate_id,
        event_type: event.event_type().to_owned(),
        payload: event.to_payload(),
        sequence_number: meta.sequence_number,
        correlation_id: meta.correlation_id,
        causation_id: meta.causation_id,
        occurred_at: meta.occurred_at,
    }
}

/// Reconstitutes a `Reservation` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    reservation_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Reservation, DomainError> {
    let mut reservation = Reservation::new(reservation_id);
    for stored in existing_events {
        let kind: ReservationEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = ReservationEvent {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                aggregate_id: stored.aggregate_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                causation_id: stored.causation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        };
        reservation.apply(&event);
    }
    Ok(reservation)
}

async fn load_existing(
    reservation_id: Uuid,
    expected_version: Option<i64>,
    repo: &dyn EventRepository,
) -> Result<Reservation, DomainError> {
    let existing_events = load_stream(repo, reservation_id, RESERVATION_CATEGORY)
        .await?
        .into_existing(reservation_id)?;
    let reservation = reconstitute(reservation_id, &existing_events)?;
    let Some(expected) = expected_version else {
        return Ok(reservation);
    };
    if expected != reservation.version() {
        warn!(
            %reservation_id,
            expected,
            actual = reservation.version(),
            "stale reservation version"
        );
        return Err(DomainError::ConcurrencyConflict {
            aggregate_id: reservation_id,
            expected,
            actual: reservation.version(),
        });
    }
    Ok(reservation)
}

async fn ensure_can_manage(
    reservation: &Reservation,
    actor: &ActorContext,
    access: &dyn ReservationAccess,
) -> Result<(), DomainError> {
    let Some(owner) = reservation.owner_client_id() else {
        return Err(DomainError::NotFound(reservation.id));
    };
    if access.can_manage(actor, owner).await? {
        Ok(())
    } else {
        Err(DomainError::Authorization(format!(
            "{} {} may not manage reservation {}",
            actor.role(),
            actor.actor_id(),
            reservation.id
        )))
    }
}

async fn persist(
    reservation: &Reservation,
    repo: &dyn EventRepository,
) -> Result<ReservationCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = reservation
        .uncommitted_events()
        .iter()
        .map(to_stored_event)
        .collect();

    repo.append_events(reservation.id, reservation.version(), &stored_events)
        .await?;

    #[allow(clippy::cast_possible_wrap)]
    let version = reservation.version() + stored_events.len() as i64;
    Ok(ReservationCommandResult {
        aggregate_id: reservation.id,
        version,
        stored_events,
    })
}

/// Handles the `SubmitReservation` command: validates the draft and creates
/// the reservation in pending status.
///
/// # Errors
///
/// Returns `DomainError::Authorization` unless the actor is a client,
/// `DomainError::Validation`/`InvalidSlot` for a bad draft,
/// `DomainError::Conflict` if the identifier is taken, and any error from
/// event loading or appending.
#[instrument(skip(command, clock, repo), fields(reservation_id = %command.reservation_id))]
pub async fn handle_submit_reservation(
    command: &SubmitReservation,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<ReservationCommandResult, DomainError> {
    let existing_events = load_stream(repo, command.reservation_id, RESERVATION_CATEGORY)
        .await?
        .into_new(command.reservation_id)?;
    let mut reservation = reconstitute(command.reservation_id, &existing_events)?;

    reservation.submit(
        &command.actor,
        &command.draft,
        command.correlation_id,
        clock,
    )?;

    let result = persist(&reservation, repo).await?;
    info!(
        correlation_id = %command.correlation_id,
        owner_client_id = %command.actor.actor_id(),
        "reservation submitted"
    );
    Ok(result)
}

/// Handles the `ConfirmReservation` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown reservation,
/// `DomainError::Authorization` if the actor may not manage it,
/// `DomainError::Conflict` for an illegal transition, and
/// `DomainError::ConcurrencyConflict` for a stale expected version.
#[instrument(skip(command, policy, clock, access, repo), fields(reservation_id = %command.reservation_id))]
pub async fn handle_confirm_reservation(
    command: &ConfirmReservation,
    policy: &LifecyclePolicy,
    clock: &dyn Clock,
    access: &dyn ReservationAccess,
    repo: &dyn EventRepository,
) -> Result<ReservationCommandResult, DomainError> {
    let mut reservation =
        load_existing(command.reservation_id, command.expected_version, repo).await?;
    ensure_can_manage(&reservation, &command.actor, access).await?;

    reservation.confirm(&command.actor, policy, command.correlation_id, clock)?;

    let result = persist(&reservation, repo).await?;
    info!(
        correlation_id = %command.correlation_id,
        actor_role = %command.actor.role(),
        "reservation confirmed"
    );
    Ok(result)
}

/// Handles the `CancelReservation` command.
///
/// # Errors
///
/// Same as [`handle_confirm_reservation`], minus the document policy.
#[instrument(skip(command, clock, access, repo), fields(reservation_id = %command.reservation_id))]
pub async fn handle_cancel_reservation(
    command: &CancelReservation,
    clock: &dyn Clock,
    access: &dyn ReservationAccess,
    repo: &dyn EventRepository,
) -> Result<ReservationCommandResult, DomainError> {
    let mut reservation =
        load_existing(command.reservation_id, command.expected_version, repo).await?;
    ensure_can_manage(&reservation, &command.actor, access).await?;

    reservation.cancel(
        &command.actor,
        command.reason.clone(),
        command.correlation_id,
        clock,
    )?;

    let result = persist(&reservation, repo).await?;
    info!(
        correlation_id = %command.correlation_id,
        actor_role = %command.actor.role(),
        "reservation cancelled"
    );
    Ok(result)
}

/// Handles the `UploadDocument` command. The owning client may always
/// upload; anyone else must be able to manage the reservation. Uploads are
/// accepted in every status.
///
/// # Errors
///
/// Returns `DomainError::InvalidSlot` for an unknown slot key (checked
/// before anything is loaded), `DomainError::NotFound` for an unknown
/// reservation and `DomainError::Authorization` if the actor may not upload.
#[instrument(skip(command, clock, access, repo), fields(reservation_id = %command.reservation_id, slot = %command.slot))]
pub async fn handle_upload_document(
    command: &UploadDocument,
    clock: &dyn Clock,
    access: &dyn ReservationAccess,
    repo: &dyn EventRepository,
) -> Result<ReservationCommandResult, DomainError> {
    let slot: DocumentKind = command.slot.parse()?;
    let mut reservation = load_existing(command.reservation_id, None, repo).await?;
    if !reservation.is_owned_by(&command.actor) {
        ensure_can_manage(&reservation, &command.actor, access).await?;
    }

    reservation.upload_document(slot, command.upload.clone(), command.correlation_id, clock);

    let result = persist(&reservation, repo).await?;
    info!(correlation_id = %command.correlation_id, "document uploaded");
    Ok(result)
}
