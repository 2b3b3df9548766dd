//! Aggregate roots for the Reservation context.

use chrono::{DateTime, Utc};
use rihla_core::actor::{ActorContext, Role};
use rihla_core::aggregate::AggregateRoot;
use rihla_core::clock::Clock;
use rihla_core::error::DomainError;
use rihla_core::event::EventMetadata;
use uuid::Uuid;

use super::documents::{DocumentKind, DocumentSet, DocumentUpload};
use super::draft::ReservationDraft;
use super::events::{
    DOCUMENT_UPLOADED_EVENT_TYPE, DocumentUploaded, RESERVATION_CANCELLED_EVENT_TYPE,
    RESERVATION_CONFIRMED_EVENT_TYPE, RESERVATION_CREATED_EVENT_TYPE, ReservationCancelled,
    ReservationConfirmed, ReservationCreated, ReservationEvent, ReservationEventKind,
};
use super::lifecycle::{LifecyclePolicy, ReservationStatus, check_transition};
use super::package::PackageDetails;
use super::traveler::{PartySize, TravelerProfile};

/// The aggregate root for a reservation.
#[derive(Debug)]
pub struct Reservation {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Owning client; `None` until created.
    pub(crate) owner_client_id: Option<Uuid>,
    /// Agency chosen by the traveler.
    pub(crate) agency_id: Option<Uuid>,
    /// Variant fields.
    pub(crate) package: Option<PackageDetails>,
    /// Traveler profile.
    pub(crate) traveler: Option<TravelerProfile>,
    /// Party size.
    pub(crate) party: PartySize,
    /// Document slots.
    pub(crate) documents: DocumentSet,
    /// Lifecycle status.
    pub(crate) status: ReservationStatus,
    /// Reason given on cancellation.
    pub(crate) cancellation_reason: Option<String>,
    /// Time of the creating event.
    pub(crate) created_at: Option<DateTime<Utc>>,
    /// Time of the latest event.
    pub(crate) updated_at: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ReservationEvent>,
}

impl Reservation {
    /// Creates an empty reservation shell, to be filled by `submit` or by
    /// replaying history.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            owner_client_id: None,
            agency_id: None,
            package: None,
            traveler: None,
            party: PartySize::default(),
            documents: DocumentSet::default(),
            status: ReservationStatus::Pending,
            cancellation_reason: None,
            created_at: None,
            updated_at: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the owning client, once created.
    #[must_use]
    pub fn owner_client_id(&self) -> Option<Uuid> {
        self.owner_client_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    /// Returns the document slots.
    #[must_use]
    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(
        &mut self,
        event_type: &str,
        kind: ReservationEventKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        let event = ReservationEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: event_type.to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    /// Validates `draft` and creates the reservation in pending status,
    /// producing a `ReservationCreated` event followed by one
    /// `DocumentUploaded` event per initial document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` unless `actor` is a client,
    /// `DomainError::Conflict` if the reservation already exists, and the
    /// validation errors of [`ReservationDraft::validate`].
    pub fn submit(
        &mut self,
        actor: &ActorContext,
        draft: &ReservationDraft,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let ActorContext::Client { client_id } = actor else {
            return Err(DomainError::Authorization(format!(
                "{} actors may not submit reservations",
                actor.role()
            )));
        };
        if self.owner_client_id.is_some() || !self.uncommitted_events.is_empty() {
            return Err(DomainError::Conflict(format!(
                "reservation {} already exists",
                self.id
            )));
        }
        let validated = draft.validate()?;

        self.record(
            RESERVATION_CREATED_EVENT_TYPE,
            ReservationEventKind::ReservationCreated(ReservationCreated {
                reservation_id: self.id,
                owner_client_id: *client_id,
                agency_id: validated.agency_id,
                package: validated.package,
                traveler: validated.traveler,
                party: validated.party,
            }),
            correlation_id,
            clock,
        );
        for (slot, upload) in validated.documents {
            self.record(
                DOCUMENT_UPLOADED_EVENT_TYPE,
                ReservationEventKind::DocumentUploaded(DocumentUploaded {
                    reservation_id: self.id,
                    slot,
                    upload,
                }),
                correlation_id,
                clock,
            );
        }
        Ok(())
    }

    /// Fills (or overwrites) a single document slot, producing a
    /// `DocumentUploaded` event. The caller is responsible for checking that
    /// the actor may upload to this reservation.
    pub fn upload_document(
        &mut self,
        slot: DocumentKind,
        upload: DocumentUpload,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        self.record(
            DOCUMENT_UPLOADED_EVENT_TYPE,
            ReservationEventKind::DocumentUploaded(DocumentUploaded {
                reservation_id: self.id,
                slot,
                upload,
            }),
            correlation_id,
            clock,
        );
    }

    /// Confirms a pending reservation, producing a `ReservationConfirmed`
    /// event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` for client actors and
    /// `DomainError::Conflict` if the reservation is already terminal or if
    /// `policy` requires complete documents and a slot is missing.
    pub fn confirm(
        &mut self,
        actor: &ActorContext,
        policy: &LifecyclePolicy,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        check_transition(actor, self.id, self.status, ReservationStatus::Confirmed)?;
        if policy.require_complete_documents && !self.documents.is_complete() {
            let missing: Vec<&str> = self
                .documents
                .missing()
                .into_iter()
                .map(DocumentKind::as_str)
                .collect();
            return Err(DomainError::Conflict(format!(
                "reservation {} cannot be confirmed while documents are missing: {}",
                self.id,
                missing.join(", ")
            )));
        }

        self.record(
            RESERVATION_CONFIRMED_EVENT_TYPE,
            ReservationEventKind::ReservationConfirmed(ReservationConfirmed {
                reservation_id: self.id,
                actor_id: actor.actor_id(),
                actor_role: actor.role(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Cancels a pending reservation, producing a `ReservationCancelled`
    /// event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` for client actors and
    /// `DomainError::Conflict` if the reservation is already terminal.
    pub fn cancel(
        &mut self,
        actor: &ActorContext,
        reason: Option<String>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        check_transition(actor, self.id, self.status, ReservationStatus::Cancelled)?;

        self.record(
            RESERVATION_CANCELLED_EVENT_TYPE,
            ReservationEventKind::ReservationCancelled(ReservationCancelled {
                reservation_id: self.id,
                actor_id: actor.actor_id(),
                actor_role: actor.role(),
                reason: reason
                    .map(|r| r.trim().to_owned())
                    .filter(|r| !r.is_empty()),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Returns `true` if the acting identity is the owning client.
    #[must_use]
    pub fn is_owned_by(&self, actor: &ActorContext) -> bool {
        actor.role() == Role::Client && self.owner_client_id == Some(actor.actor_id())
    }
}

impl AggregateRoot for Reservation {
    type Event = ReservationEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        let at = event.metadata.occurred_at;
        match &event.kind {
            ReservationEventKind::ReservationCreated(payload) => {
                self.owner_client_id = Some(payload.owner_client_id);
                self.agency_id = payload.agency_id;
                self.package = Some(payload.package.clone());
                self.traveler = Some(payload.traveler.clone());
                self.party = payload.party;
                self.status = ReservationStatus::Pending;
                self.created_at = Some(at);
            }
            ReservationEventKind::DocumentUploaded(payload) => {
                self.documents.record(payload.slot, &payload.upload, at);
            }
            ReservationEventKind::ReservationConfirmed(_) => {
                self.status = ReservationStatus::Confirmed;
            }
            ReservationEventKind::ReservationCancelled(payload) => {
                self.status = ReservationStatus::Cancelled;
                self.cancellation_reason.clone_from(&payload.reason);
            }
        }
        self.updated_at = Some(at);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
