//! Port for affiliation checks on existing reservations.

use async_trait::async_trait;
use rihla_core::actor::ActorContext;
use rihla_core::error::DomainError;
use uuid::Uuid;

/// Decides whether an actor may manage (transition, attach documents to)
/// reservations owned by a given client.
///
/// Implementations must evaluate against current affiliation data on every
/// call.
#[async_trait]
pub trait ReservationAccess: Send + Sync {
    /// Returns `true` if `actor` manages reservations of `owner_client_id`.
    async fn can_manage(
        &self,
        actor: &ActorContext,
        owner_client_id: Uuid,
    ) -> Result<bool, DomainError>;
}
