//! Command handlers for the Directory context.

use rihla_core::aggregate::AggregateRoot;
use rihla_core::clock::Clock;
use rihla_core::error::DomainError;
use rihla_core::event::{DomainEvent, EventMetadata};
use rihla_core::repository::{EventRepository, StoredEvent, load_stream};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::query_handlers::{AGENCY_CATEGORY, CLIENT_CATEGORY};
use crate::domain::aggregates::{Agency, Client};
use crate::domain::commands::{ChangeClientCity, RegisterAgency, RegisterClient};
use crate::domain::events::{AgencyEvent, AgencyEventKind, ClientEvent, ClientEventKind};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct DirectoryCommandResult {
    /// The aggregate ID affected by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

fn to_stored_event<E: DomainEvent>(event: &E) -> StoredEvent {
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

fn metadata_of(stored: &StoredEvent) -> EventMetadata {
    EventMetadata {
        event_id: stored.event_id,
        event_type: stored.event_type.clone(),
        aggregate_id: stored.aggregate_id,
        sequence_number: stored.sequence_number,
        correlation_id: stored.correlation_id,
        causation_id: stored.causation_id,
        occurred_at: stored.occurred_at,
    }
}

fn decode<K: DeserializeOwned>(stored: &StoredEvent) -> Result<K, DomainError> {
    serde_json::from_value(stored.payload.clone())
        .map_err(|e| DomainError::Infrastructure(format!("event deserialization failed: {e}")))
}

/// Reconstitutes a `Client` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute_client(
    client_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Client, DomainError> {
    let mut client = Client::new(client_id);
    for stored in existing_events {
        let kind: ClientEventKind = decode(stored)?;
        client.apply(&ClientEvent {
            metadata: metadata_of(stored),
            kind,
        });
    }
    Ok(client)
}

/// Reconstitutes an `Agency` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute_agency(
    agency_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Agency, DomainError> {
    let mut agency = Agency::new(agency_id);
    for stored in existing_events {
        let kind: AgencyEventKind = decode(stored)?;
        agency.apply(&AgencyEvent {
            metadata: metadata_of(stored),
            kind,
        });
    }
    Ok(agency)
}

async fn persist<A: AggregateRoot>(
    aggregate: &A,
    repo: &dyn EventRepository,
) -> Result<DirectoryCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = aggregate
        .uncommitted_events()
        .iter()
        .map(to_stored_event)
        .collect();

    if !stored_events.is_empty() {
        repo.append_events(aggregate.aggregate_id(), aggregate.version(), &stored_events)
            .await?;
    }

    Ok(DirectoryCommandResult {
        aggregate_id: aggregate.aggregate_id(),
        stored_events,
    })
}

/// Handles the `RegisterClient` command.
///
/// # Errors
///
/// Returns `DomainError::Authorization` unless the actor is the client
/// itself or an admin, `DomainError::Conflict` if the client exists, and
/// `DomainError::Validation` for bad fields.
#[instrument(skip(command, clock, repo), fields(client_id = %command.client_id))]
pub async fn handle_register_client(
    command: &RegisterClient,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<DirectoryCommandResult, DomainError> {
    let existing_events = load_stream(repo, command.client_id, CLIENT_CATEGORY)
        .await?
        .into_new(command.client_id)?;
    let mut client = reconstitute_client(command.client_id, &existing_events)?;

    client.register(
        &command.actor,
        &command.full_name,
        &command.email,
        &command.city,
        command.agency_id,
        command.correlation_id,
        clock,
    )?;

    let result = persist(&client, repo).await?;
    info!(correlation_id = %command.correlation_id, "client registered");
    Ok(result)
}

/// Handles the `ChangeClientCity` command. Agency visibility follows the new
/// city from the next query on.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown client,
/// `DomainError::Authorization` unless the actor is the client itself or an
/// admin, and `DomainError::Validation` for a blank city.
#[instrument(skip(command, clock, repo), fields(client_id = %command.client_id))]
pub async fn handle_change_client_city(
    command: &ChangeClientCity,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<DirectoryCommandResult, DomainError> {
    let existing_events = load_stream(repo, command.client_id, CLIENT_CATEGORY)
        .await?
        .into_existing(command.client_id)?;
    let mut client = reconstitute_client(command.client_id, &existing_events)?;

    client.change_city(&command.actor, &command.city, command.correlation_id, clock)?;

    let result = persist(&client, repo).await?;
    info!(
        correlation_id = %command.correlation_id,
        city = client.city(),
        changed = !result.stored_events.is_empty(),
        "client city change handled"
    );
    Ok(result)
}

/// Handles the `RegisterAgency` command.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for non-admin actors,
/// `DomainError::Conflict` if the agency exists, and
/// `DomainError::Validation` for a blank name or city.
#[instrument(skip(command, clock, repo), fields(agency_id = %command.agency_id))]
pub async fn handle_register_agency(
    command: &RegisterAgency,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<DirectoryCommandResult, DomainError> {
    let existing_events = load_stream(repo, command.agency_id, AGENCY_CATEGORY)
        .await?
        .into_new(command.agency_id)?;
    let mut agency = reconstitute_agency(command.agency_id, &existing_events)?;

    agency.register(
        &command.actor,
        &command.name,
        &command.city,
        command.correlation_id,
        clock,
    )?;

    let result = persist(&agency, repo).await?;
    info!(correlation_id = %command.correlation_id, "agency registered");
    Ok(result)
}
