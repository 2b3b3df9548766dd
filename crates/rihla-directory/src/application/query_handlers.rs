//! Query handlers for the Directory context.
//!
//! Unscoped reads over the client and agency categories; the visibility
//! layer filters them per actor.

use chrono::{DateTime, Utc};
use rihla_core::aggregate::AggregateRoot;
use rihla_core::error::DomainError;
use rihla_core::repository::{EventRepository, group_by_aggregate, load_stream};
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers::{reconstitute_agency, reconstitute_client};
use crate::domain::aggregates::{Agency, Client};

/// Category under which client events are stored.
pub const CLIENT_CATEGORY: &str = "client";
/// Category under which agency events are stored.
pub const AGENCY_CATEGORY: &str = "agency";

/// Read-only view of a client record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    /// The client identifier.
    pub id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Contact e-mail.
    pub email: String,
    /// Current city.
    pub city: String,
    /// Agency the client signed up through.
    pub agency_id: Option<Uuid>,
    /// Registration time.
    pub registration_date: DateTime<Utc>,
    /// Current version (event count).
    pub version: i64,
}

/// Read-only view of an agency record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyView {
    /// The agency identifier.
    pub id: Uuid,
    /// Trading name.
    pub name: String,
    /// City the agency operates in.
    pub city: String,
    /// Registration time.
    pub registration_date: DateTime<Utc>,
}

fn client_view(client: &Client) -> Option<ClientView> {
    Some(ClientView {
        id: client.id,
        full_name: client.full_name.clone(),
        email: client.email.clone(),
        city: client.city.clone(),
        agency_id: client.agency_id,
        registration_date: client.registered_at?,
        version: client.version(),
    })
}

fn agency_view(agency: &Agency) -> Option<AgencyView> {
    Some(AgencyView {
        id: agency.id,
        name: agency.name.clone(),
        city: agency.city.clone(),
        registration_date: agency.registered_at?,
    })
}

/// Retrieves a client by ID.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the client is not registered.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_client_by_id(
    client_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<ClientView, DomainError> {
    let stored_events = load_stream(repo, client_id, CLIENT_CATEGORY)
        .await?
        .into_existing(client_id)?;
    let client = reconstitute_client(client_id, &stored_events)?;
    client_view(&client).ok_or(DomainError::NotFound(client_id))
}

/// Lists every registered client, most recently registered first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if loading or deserialization fails.
pub async fn list_clients(repo: &dyn EventRepository) -> Result<Vec<ClientView>, DomainError> {
    let events = repo.load_category(CLIENT_CATEGORY).await?;
    let mut views = Vec::new();
    for (client_id, stream) in group_by_aggregate(events) {
        if let Some(view) = client_view(&reconstitute_client(client_id, &stream)?) {
            views.push(view);
        }
    }
    views.sort_by(|a, b| b.registration_date.cmp(&a.registration_date));
    Ok(views)
}

/// Retrieves an agency by ID.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the agency is not registered.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_agency_by_id(
    agency_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<AgencyView, DomainError> {
    let stored_events = load_stream(repo, agency_id, AGENCY_CATEGORY)
        .await?
        .into_existing(agency_id)?;
    let agency = reconstitute_agency(agency_id, &stored_events)?;
    agency_view(&agency).ok_or(DomainError::NotFound(agency_id))
}

/// Lists every registered agency, most recently registered first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if loading or deserialization fails.
pub async fn list_agencies(repo: &dyn EventRepository) -> Result<Vec<AgencyView>, DomainError> {
    let events = repo.load_category(AGENCY_CATEGORY).await?;
    let mut views = Vec::new();
    for (agency_id, stream) in group_by_aggregate(events) {
        if let Some(view) = agency_view(&reconstitute_agency(agency_id, &stream)?) {
            views.push(view);
        }
    }
    views.sort_by(|a, b| b.registration_date.cmp(&a.registration_date));
    Ok(views)
}
