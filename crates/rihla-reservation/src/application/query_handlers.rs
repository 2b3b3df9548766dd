//! Query handlers for the Reservation context.
//!
//! These are unscoped reads. Role-based filtering is applied on top of them
//! by the visibility layer.

use chrono::{DateTime, Utc};
use rihla_core::aggregate::AggregateRoot;
use rihla_core::error::DomainError;
use rihla_core::repository::{EventRepository, group_by_aggregate, load_stream};
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::Reservation;
use crate::domain::documents::{DocumentKind, DocumentSet};
use crate::domain::lifecycle::ReservationStatus;
use crate::domain::package::PackageDetails;
use crate::domain::traveler::TravelerProfile;

/// Category under which every reservation event is stored.
pub const RESERVATION_CATEGORY: &str = "reservation";

/// Read-only view of a reservation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    /// The reservation identifier.
    pub id: Uuid,
    /// Owning client.
    pub owner_client_id: Uuid,
    /// Agency chosen by the traveler.
    pub agency_id: Option<Uuid>,
    /// Variant fields, flattened next to `packageType`.
    #[serde(flatten)]
    pub package: PackageDetails,
    /// Traveler profile.
    pub traveler_profile: TravelerProfile,
    /// Number of adults.
    pub adults: u32,
    /// Number of children.
    pub children: u32,
    /// Document slots.
    pub documents: DocumentSet,
    /// `true` iff all four slots exist.
    pub documents_complete: bool,
    /// Lifecycle status.
    pub status: ReservationStatus,
    /// Reason given on cancellation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the latest change.
    pub updated_at: DateTime<Utc>,
    /// Current version (event count).
    pub version: i64,
}

/// Completeness report for the four document slots of a reservation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatusView {
    /// The reservation identifier.
    pub reservation_id: Uuid,
    /// `true` iff every slot exists.
    pub complete: bool,
    /// Slots still missing, in display order.
    pub missing: Vec<DocumentKind>,
    /// Per-slot existence and metadata.
    pub documents: DocumentSet,
}

fn to_view(reservation: &Reservation) -> Option<ReservationView> {
    Some(ReservationView {
        id: reservation.id,
        owner_client_id: reservation.owner_client_id?,
        agency_id: reservation.agency_id,
        package: reservation.package.clone()?,
        traveler_profile: reservation.traveler.clone()?,
        adults: reservation.party.adults,
        children: reservation.party.children,
        documents: reservation.documents.clone(),
        documents_complete: reservation.documents.is_complete(),
        status: reservation.status,
        cancellation_reason: reservation.cancellation_reason.clone(),
        created_at: reservation.created_at?,
        updated_at: reservation.updated_at?,
        version: reservation.version(),
    })
}

/// Retrieves a reservation by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no reservation exists for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_reservation_by_id(
    reservation_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<ReservationView, DomainError> {
    let stored_events = load_stream(repo, reservation_id, RESERVATION_CATEGORY)
        .await?
        .into_existing(reservation_id)?;
    let reservation = command_handlers::reconstitute(reservation_id, &stored_events)?;
    to_view(&reservation).ok_or(DomainError::NotFound(reservation_id))
}

/// Lists every reservation, newest first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if loading or deserialization fails.
pub async fn list_reservations(
    repo: &dyn EventRepository,
) -> Result<Vec<ReservationView>, DomainError> {
    let events = repo.load_category(RESERVATION_CATEGORY).await?;
    let mut views = Vec::new();
    for (reservation_id, stream) in group_by_aggregate(events) {
        let reservation = command_handlers::reconstitute(reservation_id, &stream)?;
        if let Some(view) = to_view(&reservation) {
            views.push(view);
        }
    }
    views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(views)
}

/// Reports which document slots of a reservation are filled.
///
/// # Errors
///
/// Same as [`get_reservation_by_id`].
pub async fn get_document_status(
    reservation_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<DocumentStatusView, DomainError> {
    let view = get_reservation_by_id(reservation_id, repo).await?;
    Ok(document_status(&view))
}

/// Builds the document report from an already-loaded view.
#[must_use]
pub fn document_status(view: &ReservationView) -> DocumentStatusView {
    DocumentStatusView {
        reservation_id: view.id,
        complete: view.documents_complete,
        missing: view.documents.missing(),
        documents: view.documents.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rihla_core::actor::ActorContext;
    use rihla_core::error::DomainError;
    use rihla_test_support::{EmptyEventRepository, FixedClock, InMemoryEventRepository};
    use uuid::Uuid;

    use super::*;
    use crate::application::command_handlers::handle_submit_reservation;
    use crate::domain::commands::SubmitReservation;
    use crate::domain::documents::DocumentUpload;
    use crate::domain::draft::ReservationDraft;

    fn hotel_draft() -> ReservationDraft {
        ReservationDraft {
            package_type: Some("hotel".into()),
            destination: Some("Istanbul".into()),
            date_from: Some("2025-03-01".into()),
            date_to: Some("2025-03-10".into()),
            rooms: Some("2".into()),
            traveler_name: Some("Ahmed".into()),
            traveler_phone: Some("0600000000".into()),
            birth_date: Some("1990-01-01".into()),
            passport_number: Some("X1".into()),
            passport_expiry: Some("2030-01-01".into()),
            address: Some("...".into()),
            emergency_contact: Some("...".into()),
            adults: Some("2".into()),
            ..ReservationDraft::default()
        }
    }

    async fn submit(
        draft: ReservationDraft,
        clock: &FixedClock,
        repo: &InMemoryEventRepository,
    ) -> Uuid {
        let command = SubmitReservation {
            correlation_id: Uuid::new_v4(),
            actor: ActorContext::Client {
                client_id: Uuid::new_v4(),
            },
            reservation_id: Uuid::new_v4(),
            draft,
        };
        handle_submit_reservation(&command, clock, repo)
            .await
            .unwrap()
            .aggregate_id
    }

    #[tokio::test]
    async fn test_get_reservation_by_id_returns_flattened_view() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let reservation_id = submit(hotel_draft(), &clock, &repo).await;

        // Act
        let view = get_reservation_by_id(reservation_id, &repo).await.unwrap();

        // Assert
        assert_eq!(view.id, reservation_id);
        assert_eq!(view.status, ReservationStatus::Pending);
        assert_eq!(view.adults, 2);
        assert_eq!(view.children, 0);
        assert_eq!(view.version, 1);
        assert!(matches!(view.package, PackageDetails::Hotel { .. }));
        assert!(!view.documents_complete);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["packageType"], "hotel");
        assert_eq!(json["destination"], "Istanbul");
        assert_eq!(json["rooms"], 2);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["travelerProfile"]["passportNumber"], "X1");
        assert_eq!(json["documents"]["passport"]["exists"], false);
        assert!(json.get("departureCity").is_none());
    }

    #[tokio::test]
    async fn test_get_reservation_by_id_returns_not_found_when_no_events() {
        // Arrange
        let reservation_id = Uuid::new_v4();
        let repo = EmptyEventRepository;

        // Act
        let result = get_reservation_by_id(reservation_id, &repo).await;

        // Assert
        match result {
            Err(DomainError::NotFound(id)) => assert_eq!(id, reservation_id),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_reservations_is_newest_first() {
        let repo = InMemoryEventRepository::new();
        let earlier = FixedClock(Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap());
        let later = FixedClock(earlier.0 + Duration::days(3));
        let first = submit(hotel_draft(), &earlier, &repo).await;
        let second = submit(hotel_draft(), &later, &repo).await;

        let views = list_reservations(&repo).await.unwrap();

        let ids: Vec<Uuid> = views.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_document_status_lists_missing_slots() {
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let mut draft = hotel_draft();
        draft
            .documents
            .insert("passport".into(), DocumentUpload::default());
        let reservation_id = submit(draft, &clock, &repo).await;

        let status = get_document_status(reservation_id, &repo).await.unwrap();

        assert!(!status.complete);
        assert_eq!(
            status.missing,
            vec![
                DocumentKind::Photo,
                DocumentKind::Identity,
                DocumentKind::Vaccination
            ]
        );
        assert!(status.documents.passport.exists);
        assert_eq!(status.documents.passport.uploaded_at, Some(clock.0));
    }

    #[tokio::test]
    async fn test_get_reservation_with_a_client_id_is_not_found() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let client_id = Uuid::new_v4();
        let event = rihla_core::repository::StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: client_id,
            event_type: "client.registered".to_owned(),
            payload: serde_json::json!({ "ClientRegistered": { "clientId": client_id } }),
            sequence_number: 1,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: FixedClock::standard().0,
        };
        repo.append_events(client_id, 0, &[event]).await.unwrap();

        // Act
        let view = get_reservation_by_id(client_id, &repo).await;
        let documents = get_document_status(client_id, &repo).await;

        // Assert
        assert!(matches!(view, Err(DomainError::NotFound(id)) if id == client_id));
        assert!(matches!(documents, Err(DomainError::NotFound(_))));
    }
}
