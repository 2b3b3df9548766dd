//! Domain events for the Reservation context.

use rihla_core::actor::Role;
use rihla_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::documents::{DocumentKind, DocumentUpload};
use super::package::PackageDetails;
use super::traveler::{PartySize, TravelerProfile};

/// Event type name for `ReservationCreated`.
pub const RESERVATION_CREATED_EVENT_TYPE: &str = "reservation.created";
/// Event type name for `DocumentUploaded`.
pub const DOCUMENT_UPLOADED_EVENT_TYPE: &str = "reservation.document_uploaded";
/// Event type name for `ReservationConfirmed`.
pub const RESERVATION_CONFIRMED_EVENT_TYPE: &str = "reservation.confirmed";
/// Event type name for `ReservationCancelled`.
pub const RESERVATION_CANCELLED_EVENT_TYPE: &str = "reservation.cancelled";

/// Emitted when a client submits a valid draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreated {
    /// The reservation identifier.
    pub reservation_id: Uuid,
    /// The client who owns the reservation.
    pub owner_client_id: Uuid,
    /// Agency chosen by the traveler, if any.
    pub agency_id: Option<Uuid>,
    /// Variant fields.
    pub package: PackageDetails,
    /// Traveler profile.
    pub traveler: TravelerProfile,
    /// Party size.
    pub party: PartySize,
}

/// Emitted when a document is uploaded into a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUploaded {
    /// The reservation identifier.
    pub reservation_id: Uuid,
    /// The slot that was filled.
    pub slot: DocumentKind,
    /// Upload metadata.
    pub upload: DocumentUpload,
}

/// Emitted when a pending reservation is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfirmed {
    /// The reservation identifier.
    pub reservation_id: Uuid,
    /// Who confirmed it.
    pub actor_id: Uuid,
    /// Role of the confirming actor.
    pub actor_role: Role,
}

/// Emitted when a pending reservation is cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCancelled {
    /// The reservation identifier.
    pub reservation_id: Uuid,
    /// Who cancelled it.
    pub actor_id: Uuid,
    /// Role of the cancelling actor.
    pub actor_role: Role,
    /// Optional free-text reason.
    pub reason: Option<String>,
}

/// Event payload variants for the Reservation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReservationEventKind {
    /// A reservation has been created in pending status.
    ReservationCreated(ReservationCreated),
    /// A document slot has been filled.
    DocumentUploaded(DocumentUploaded),
    /// The reservation has been confirmed.
    ReservationConfirmed(ReservationConfirmed),
    /// The reservation has been cancelled.
    ReservationCancelled(ReservationCancelled),
}

/// Domain event envelope for the Reservation context.
#[derive(Debug, Clone)]
pub struct ReservationEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ReservationEventKind,
}

impl DomainEvent for ReservationEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ReservationEventKind::ReservationCreated(_) => RESERVATION_CREATED_EVENT_TYPE,
            ReservationEventKind::DocumentUploaded(_) => DOCUMENT_UPLOADED_EVENT_TYPE,
            ReservationEventKind::ReservationConfirmed(_) => RESERVATION_CONFIRMED_EVENT_TYPE,
            ReservationEventKind::ReservationCancelled(_) => RESERVATION_CANCELLED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("ReservationEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
