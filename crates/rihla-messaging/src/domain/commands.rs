//! Commands for the Messaging context.

use rihla_core::actor::ActorContext;
use rihla_core::command::Command;
use uuid::Uuid;

use super::events::RecipientType;

/// Command to send a notification.
#[derive(Debug, Clone)]
pub struct SendNotification {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The acting admin.
    pub actor: ActorContext,
    /// The notification identifier.
    pub notification_id: Uuid,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Audience selector.
    pub recipient_type: RecipientType,
    /// Recipients; required and non-empty for `Specific`.
    pub recipient_user_ids: Vec<Uuid>,
}

/// Command to submit an agency report.
#[derive(Debug, Clone)]
pub struct SubmitReport {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The submitting agency.
    pub actor: ActorContext,
    /// The report identifier.
    pub report_id: Uuid,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
}

impl Command for SendNotification {
    fn command_type(&self) -> &'static str {
        "messaging.send_notification"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ActorContext {
        &self.actor
    }
}

impl Command for SubmitReport {
    fn command_type(&self) -> &'static str {
        "messaging.submit_report"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ActorContext {
        &self.actor
    }
}
