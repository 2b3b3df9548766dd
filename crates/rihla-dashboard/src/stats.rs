//! Dashboard computation.

use rihla_core::actor::ActorContext;
use rihla_core::error::DomainError;
use rihla_core::repository::EventRepository;
use rihla_directory::application::query_handlers::list_agencies;
use rihla_messaging::application::query_handlers::{NotificationView, all_notifications};
use rihla_messaging::domain::events::RecipientType;
use rihla_reservation::application::query_handlers::ReservationView;
use rihla_reservation::domain::lifecycle::ReservationStatus;
use rihla_visibility::queries::{visible_clients, visible_reservations};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Reservation counts per lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Awaiting a decision.
    pub pending: usize,
    /// Confirmed.
    pub confirmed: usize,
    /// Cancelled.
    pub cancelled: usize,
}

impl StatusCounts {
    fn tally(reservations: &[ReservationView]) -> Self {
        reservations.iter().fold(Self::default(), |mut counts, r| {
            match r.status {
                ReservationStatus::Pending => counts.pending += 1,
                ReservationStatus::Confirmed => counts.confirmed += 1,
                ReservationStatus::Cancelled => counts.cancelled += 1,
            }
            counts
        })
    }
}

/// Headline counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    /// Visible clients.
    pub clients: usize,
    /// Registered agencies; admin only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agencies: Option<usize>,
    /// Visible reservations.
    pub reservations: usize,
    /// Visible reservations per status.
    pub reservations_by_status: StatusCounts,
}

/// Everything shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Headline counters.
    pub counts: DashboardCounts,
    /// Most recently created visible reservations.
    pub recent_reservations: Vec<ReservationView>,
    /// Most recently sent notifications relevant to the actor.
    pub recent_notifications: Vec<NotificationView>,
}

/// Computes the dashboard for `actor`: global for admins, city-scoped for
/// agencies. An agency sees notifications sent to everyone or to at least
/// one of its visible clients.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for client actors and
/// `DomainError::Infrastructure` if a store cannot be read.
#[instrument(skip(actor, repo), fields(role = %actor.role()))]
pub async fn compute_dashboard(
    actor: &ActorContext,
    recent_limit: usize,
    repo: &dyn EventRepository,
) -> Result<DashboardView, DomainError> {
    if let ActorContext::Client { .. } = actor {
        return Err(DomainError::Authorization(
            "client actors may not view the dashboard".to_owned(),
        ));
    }

    let clients = visible_clients(actor, repo).await?;
    let reservations = visible_reservations(actor, repo).await?;
    let agencies = if actor.is_admin() {
        Some(list_agencies(repo).await?.len())
    } else {
        None
    };

    let mut notifications = all_notifications(repo).await?;
    if !actor.is_admin() {
        let client_ids: Vec<Uuid> = clients.iter().map(|c| c.id).collect();
        notifications.retain(|n| {
            n.recipient_type == RecipientType::All
                || client_ids.iter().any(|id| n.is_addressed_to(*id))
        });
    }

    let counts = DashboardCounts {
        clients: clients.len(),
        agencies,
        reservations: reservations.len(),
        reservations_by_status: StatusCounts::tally(&reservations),
    };
    debug!(?counts, "dashboard computed");

    // Both lists already come newest first.
    let recent_reservations = reservations.into_iter().take(recent_limit).collect();
    notifications.truncate(recent_limit);

    Ok(DashboardView {
        counts,
        recent_reservations,
        recent_notifications: notifications,
    })
}
