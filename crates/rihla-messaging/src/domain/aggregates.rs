//! Aggregate roots for the Messaging context.
//!
//! Both notifications and reports are write-once: a single creating event,
//! immutable afterwards.

use chrono::{DateTime, Utc};
use rihla_core::actor::ActorContext;
use rihla_core::aggregate::AggregateRoot;
use rihla_core::clock::Clock;
use rihla_core::error::DomainError;
use rihla_core::event::EventMetadata;
use uuid::Uuid;

use super::events::{
    NOTIFICATION_SENT_EVENT_TYPE, NotificationEvent, NotificationEventKind, NotificationSent,
    REPORT_SUBMITTED_EVENT_TYPE, RecipientType, ReportEvent, ReportEventKind, ReportSubmitted,
};

fn first_event_metadata(
    event_type: &str,
    aggregate_id: Uuid,
    correlation_id: Uuid,
    clock: &dyn Clock,
) -> EventMetadata {
    EventMetadata {
        event_id: Uuid::new_v4(),
        event_type: event_type.to_owned(),
        aggregate_id,
        sequence_number: 1,
        correlation_id,
        causation_id: correlation_id,
        occurred_at: clock.now(),
    }
}

/// The aggregate root for a notification.
#[derive(Debug)]
pub struct Notification {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Headline.
    pub(crate) title: String,
    /// Body text.
    pub(crate) content: String,
    /// Audience selector.
    pub(crate) recipient_type: RecipientType,
    /// Recipients for `Specific`.
    pub(crate) recipient_user_ids: Vec<Uuid>,
    /// Send time; `None` until sent.
    pub(crate) sent_at: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<NotificationEvent>,
}

impl Notification {
    /// Creates an empty notification shell.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            title: String::new(),
            content: String::new(),
            recipient_type: RecipientType::All,
            recipient_user_ids: Vec::new(),
            sent_at: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Sends the notification, producing a `NotificationSent` event.
    ///
    /// Recipient ids are deduplicated in first-seen order. For
    /// `RecipientType::All` any supplied list is dropped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` for non-admin actors,
    /// `DomainError::Conflict` if already sent, and `DomainError::Validation`
    /// for a blank title/content or an empty specific audience.
    #[allow(clippy::too_many_arguments)]
    pub fn send(
        &mut self,
        actor: &ActorContext,
        title: &str,
        content: &str,
        recipient_type: RecipientType,
        recipient_user_ids: &[Uuid],
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        actor.require_admin("send notifications")?;
        if self.sent_at.is_some() || !self.uncommitted_events.is_empty() {
            return Err(DomainError::Conflict(format!(
                "notification {} has already been sent",
                self.id
            )));
        }

        let mut invalid: Vec<&str> = [("title", title), ("content", content)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();
        if recipient_type == RecipientType::Specific && recipient_user_ids.is_empty() {
            invalid.push("recipientUserIds");
        }
        if !invalid.is_empty() {
            return Err(DomainError::invalid_fields(
                "notification fields are missing",
                invalid,
            ));
        }

        let recipients = match recipient_type {
            RecipientType::All => Vec::new(),
            RecipientType::Specific => {
                let mut unique = Vec::with_capacity(recipient_user_ids.len());
                for id in recipient_user_ids {
                    if !unique.contains(id) {
                        unique.push(*id);
                    }
                }
                unique
            }
        };

        self.uncommitted_events.push(NotificationEvent {
            metadata: first_event_metadata(
                NOTIFICATION_SENT_EVENT_TYPE,
                self.id,
                correlation_id,
                clock,
            ),
            kind: NotificationEventKind::NotificationSent(NotificationSent {
                notification_id: self.id,
                title: title.trim().to_owned(),
                content: content.trim().to_owned(),
                recipient_type,
                recipient_user_ids: recipients,
            }),
        });
        Ok(())
    }
}

impl AggregateRoot for Notification {
    type Event = NotificationEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            NotificationEventKind::NotificationSent(payload) => {
                self.title.clone_from(&payload.title);
                self.content.clone_from(&payload.content);
                self.recipient_type = payload.recipient_type;
                self.recipient_user_ids.clone_from(&payload.recipient_user_ids);
                self.sent_at = Some(event.metadata.occurred_at);
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

/// The aggregate root for an agency report.
#[derive(Debug)]
pub struct Report {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Submitting agency; `None` until submitted.
    pub(crate) agency_id: Option<Uuid>,
    /// Headline.
    pub(crate) title: String,
    /// Body text.
    pub(crate) content: String,
    /// Submission time.
    pub(crate) submitted_at: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ReportEvent>,
}

impl Report {
    /// Creates an empty report shell.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            agency_id: None,
            title: String::new(),
            content: String::new(),
            submitted_at: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Submits the report, producing a `ReportSubmitted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` unless `actor` is an agency,
    /// `DomainError::Conflict` if already submitted, and
    /// `DomainError::Validation` for a blank title or content.
    pub fn submit(
        &mut self,
        actor: &ActorContext,
        title: &str,
        content: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let ActorContext::Agency { agency_id, .. } = actor else {
            return Err(DomainError::Authorization(format!(
                "{} actors may not submit reports",
                actor.role()
            )));
        };
        if self.submitted_at.is_some() || !self.uncommitted_events.is_empty() {
            return Err(DomainError::Conflict(format!(
                "report {} has already been submitted",
                self.id
            )));
        }
        DomainError::require_non_blank(&[("title", title), ("content", content)])?;

        self.uncommitted_events.push(ReportEvent {
            metadata: first_event_metadata(
                REPORT_SUBMITTED_EVENT_TYPE,
                self.id,
                correlation_id,
                clock,
            ),
            kind: ReportEventKind::ReportSubmitted(ReportSubmitted {
                report_id: self.id,
                agency_id: *agency_id,
                title: title.trim().to_owned(),
                content: content.trim().to_owned(),
            }),
        });
        Ok(())
    }
}

impl AggregateRoot for Report {
    type Event = ReportEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            ReportEventKind::ReportSubmitted(payload) => {
                self.agency_id = Some(payload.agency_id);
                self.title.clone_from(&payload.title);
                self.content.clone_from(&payload.content);
                self.submitted_at = Some(event.metadata.occurred_at);
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
