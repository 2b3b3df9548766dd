//! City-scoped implementation of the reservation access port.

use async_trait::async_trait;
use rihla_core::actor::ActorContext;
use rihla_core::error::DomainError;
use rihla_core::repository::EventRepository;
use rihla_directory::application::query_handlers::get_client_by_id;
use rihla_reservation::domain::access::ReservationAccess;
use tracing::debug;
use uuid::Uuid;

use crate::rules::same_city;

/// Whether an agency in `agency_city` serves `client_id`, judged on the
/// client's city as of now. Unknown clients are served by nobody.
///
/// # Errors
///
/// Propagates repository failures other than `NotFound`.
pub async fn agency_serves_client(
    agency_city: &str,
    client_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<bool, DomainError> {
    match get_client_by_id(client_id, repo).await {
        Ok(client) => Ok(same_city(agency_city, &client.city)),
        Err(DomainError::NotFound(_)) => {
            debug!(%client_id, "reservation owner is not in the directory");
            Ok(false)
        }
        Err(other) => Err(other),
    }
}

/// Grants management of a reservation to admins and to agencies located in
/// the owning client's current city.
pub struct CityScopedAccess<'a> {
    repo: &'a dyn EventRepository,
}

impl<'a> CityScopedAccess<'a> {
    /// Creates an access check reading the directory from `repo`.
    #[must_use]
    pub fn new(repo: &'a dyn EventRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ReservationAccess for CityScopedAccess<'_> {
    async fn can_manage(
        &self,
        actor: &ActorContext,
        owner_client_id: Uuid,
    ) -> Result<bool, DomainError> {
        match actor {
            ActorContext::Admin { .. } => Ok(true),
            ActorContext::Client { .. } => Ok(false),
            ActorContext::Agency { city, .. } => {
                agency_serves_client(city, owner_client_id, self.repo).await
            }
        }
    }
}
