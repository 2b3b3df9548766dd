//! Commands for the Reservation context.

use rihla_core::actor::ActorContext;
use rihla_core::command::Command;
use uuid::Uuid;

use super::documents::DocumentUpload;
use super::draft::ReservationDraft;

/// Command to submit a new reservation.
#[derive(Debug, Clone)]
pub struct SubmitReservation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The submitting actor; must be a client.
    pub actor: ActorContext,
    /// Identifier to assign to the new reservation.
    pub reservation_id: Uuid,
    /// The unvalidated draft.
    pub draft: ReservationDraft,
}

/// Command to confirm a pending reservation.
#[derive(Debug, Clone)]
pub struct ConfirmReservation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The acting agency or admin.
    pub actor: ActorContext,
    /// The reservation identifier.
    pub reservation_id: Uuid,
    /// Version the caller last read; rejected if the record has moved on.
    pub expected_version: Option<i64>,
}

/// Command to cancel a pending reservation.
#[derive(Debug, Clone)]
pub struct CancelReservation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The acting agency or admin.
    pub actor: ActorContext,
    /// The reservation identifier.
    pub reservation_id: Uuid,
    /// Optional free-text reason.
    pub reason: Option<String>,
    /// Version the caller last read; rejected if the record has moved on.
    pub expected_version: Option<i64>,
}

/// Command to upload a document into one of the four slots.
#[derive(Debug, Clone)]
pub struct UploadDocument {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The uploading actor.
    pub actor: ActorContext,
    /// The reservation identifier.
    pub reservation_id: Uuid,
    /// Raw slot key as supplied by the caller.
    pub slot: String,
    /// Upload metadata.
    pub upload: DocumentUpload,
}

macro_rules! impl_command {
    ($command:ty, $name:literal) => {
        impl Command for $command {
            fn command_type(&self) -> &'static str {
                $name
            }

            fn correlation_id(&self) -> Uuid {
                self.correlation_id
            }

            fn actor(&self) -> &ActorContext {
                &self.actor
            }
        }
    };
}

impl_command!(SubmitReservation, "reservation.submit");
impl_command!(ConfirmReservation, "reservation.confirm");
impl_command!(CancelReservation, "reservation.cancel");
impl_command!(UploadDocument, "reservation.upload_document");
