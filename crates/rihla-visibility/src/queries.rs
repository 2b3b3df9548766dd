//! Actor-scoped reads over the directory and reservation stores.
//!
//! Single-record reads distinguish an unknown id (`NotFound`) from a record
//! that exists but lies outside the actor's scope (`Authorization`).

use rihla_core::actor::ActorContext;
use rihla_core::error::DomainError;
use rihla_core::repository::EventRepository;
use rihla_directory::application::query_handlers::{
    AgencyView, ClientView, get_agency_by_id, get_client_by_id, list_agencies, list_clients,
};
use rihla_reservation::application::query_handlers::{
    DocumentStatusView, ReservationView, document_status, get_reservation_by_id,
    list_reservations,
};
use uuid::Uuid;

use crate::access::agency_serves_client;
use crate::rules::{ClientScope, agency_visible_to, client_visible_to, ensure_may_read_agencies};

fn out_of_scope(actor: &ActorContext, what: &str, id: Uuid) -> DomainError {
    DomainError::Authorization(format!(
        "{} {} may not access {what} {id}",
        actor.role(),
        actor.actor_id()
    ))
}

/// Resolves the set of clients `actor` is scoped to. Only agencies need the
/// directory; it is read fresh on every call.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the directory cannot be read.
pub async fn client_scope(
    actor: &ActorContext,
    repo: &dyn EventRepository,
) -> Result<ClientScope, DomainError> {
    let clients = match actor {
        ActorContext::Agency { .. } => list_clients(repo).await?,
        ActorContext::Admin { .. } | ActorContext::Client { .. } => Vec::new(),
    };
    Ok(ClientScope::resolve(actor, &clients))
}

/// Clients visible to `actor`, most recently registered first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the directory cannot be read.
pub async fn visible_clients(
    actor: &ActorContext,
    repo: &dyn EventRepository,
) -> Result<Vec<ClientView>, DomainError> {
    let mut clients = list_clients(repo).await?;
    clients.retain(|c| client_visible_to(actor, c.id, &c.city));
    Ok(clients)
}

/// A single client, if visible to `actor`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown client and
/// `DomainError::Authorization` for a client outside the actor's scope.
pub async fn get_visible_client(
    actor: &ActorContext,
    client_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<ClientView, DomainError> {
    let client = get_client_by_id(client_id, repo).await?;
    if client_visible_to(actor, client.id, &client.city) {
        Ok(client)
    } else {
        Err(out_of_scope(actor, "client", client_id))
    }
}

/// Reservations visible to `actor`, newest first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a store cannot be read.
pub async fn visible_reservations(
    actor: &ActorContext,
    repo: &dyn EventRepository,
) -> Result<Vec<ReservationView>, DomainError> {
    let scope = client_scope(actor, repo).await?;
    let mut reservations = list_reservations(repo).await?;
    reservations.retain(|r| scope.includes(r.owner_client_id));
    Ok(reservations)
}

async fn reservation_visible_to(
    actor: &ActorContext,
    reservation: &ReservationView,
    repo: &dyn EventRepository,
) -> Result<bool, DomainError> {
    match actor {
        ActorContext::Admin { .. } => Ok(true),
        ActorContext::Client { client_id } => Ok(*client_id == reservation.owner_client_id),
        ActorContext::Agency { city, .. } => {
            agency_serves_client(city, reservation.owner_client_id, repo).await
        }
    }
}

/// A single reservation, if visible to `actor`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown reservation and
/// `DomainError::Authorization` for one outside the actor's scope.
pub async fn get_visible_reservation(
    actor: &ActorContext,
    reservation_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<ReservationView, DomainError> {
    let reservation = get_reservation_by_id(reservation_id, repo).await?;
    if reservation_visible_to(actor, &reservation, repo).await? {
        Ok(reservation)
    } else {
        Err(out_of_scope(actor, "reservation", reservation_id))
    }
}

/// Document completeness of a reservation visible to `actor`.
///
/// # Errors
///
/// Same as [`get_visible_reservation`].
pub async fn get_visible_document_status(
    actor: &ActorContext,
    reservation_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<DocumentStatusView, DomainError> {
    let reservation = get_visible_reservation(actor, reservation_id, repo).await?;
    Ok(document_status(&reservation))
}

/// Agencies visible to `actor`: all for admins, itself for an agency.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for client actors.
pub async fn visible_agencies(
    actor: &ActorContext,
    repo: &dyn EventRepository,
) -> Result<Vec<AgencyView>, DomainError> {
    ensure_may_read_agencies(actor)?;
    let mut agencies = list_agencies(repo).await?;
    agencies.retain(|a| agency_visible_to(actor, a.id));
    Ok(agencies)
}

/// A single agency, if visible to `actor`.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for client actors and for agencies
/// reading another agency, and `DomainError::NotFound` for an unknown id.
pub async fn get_visible_agency(
    actor: &ActorContext,
    agency_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<AgencyView, DomainError> {
    ensure_may_read_agencies(actor)?;
    let agency = get_agency_by_id(agency_id, repo).await?;
    if agency_visible_to(actor, agency.id) {
        Ok(agency)
    } else {
        Err(out_of_scope(actor, "agency", agency_id))
    }
}
