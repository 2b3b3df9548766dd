//! Domain events for the Messaging context.

use rihla_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type name for `NotificationSent`.
pub const NOTIFICATION_SENT_EVENT_TYPE: &str = "notification.sent";
/// Event type name for `ReportSubmitted`.
pub const REPORT_SUBMITTED_EVENT_TYPE: &str = "report.submitted";

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    /// Every client.
    All,
    /// The clients listed in `recipient_user_ids`.
    Specific,
}

/// Emitted when an admin sends a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSent {
    /// The notification identifier.
    pub notification_id: Uuid,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Audience selector.
    pub recipient_type: RecipientType,
    /// Deduplicated recipients; empty for `All`.
    pub recipient_user_ids: Vec<Uuid>,
}

/// Emitted when an agency submits a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmitted {
    /// The report identifier.
    pub report_id: Uuid,
    /// Submitting agency.
    pub agency_id: Uuid,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
}

/// Event payload variants for notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationEventKind {
    /// A notification has been sent.
    NotificationSent(NotificationSent),
}

/// Event payload variants for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportEventKind {
    /// A report has been submitted.
    ReportSubmitted(ReportSubmitted),
}

/// Domain event envelope for notifications.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: NotificationEventKind,
}

/// Domain event envelope for reports.
#[derive(Debug, Clone)]
pub struct ReportEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ReportEventKind,
}

impl DomainEvent for NotificationEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            NotificationEventKind::NotificationSent(_) => NOTIFICATION_SENT_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("NotificationEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

impl DomainEvent for ReportEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ReportEventKind::ReportSubmitted(_) => REPORT_SUBMITTED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("ReportEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
