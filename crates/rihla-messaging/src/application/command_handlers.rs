//! Command handlers for the Messaging context.

use rihla_core::aggregate::AggregateRoot;
use rihla_core::clock::Clock;
use rihla_core::error::DomainError;
use rihla_core::event::{DomainEvent, EventMetadata};
use rihla_core::repository::{EventRepository, StoredEvent, load_stream};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::query_handlers::{NOTIFICATION_CATEGORY, REPORT_CATEGORY};
use crate::domain::aggregates::{Notification, Report};
use crate::domain::commands::{SendNotification, SubmitReport};
use crate::domain::events::{
    NotificationEvent, NotificationEventKind, ReportEvent, ReportEventKind,
};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct MessagingCommandResult {
    /// The aggregate ID affected by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

fn to_stored_event<E: DomainEvent>(event: &E) -> StoredEvent {
    let meta = event.metadata();
    StoredEvent {
        event_id: meta.event_id,
        aggregate_id: meta.aggregate_id,
        event_type: event.event_type().to_owned(),
        payload: event.to_payload(),
        sequence_number: meta.sequence_number,
        correlation_id: meta.correlation_id,
        causation_id: meta.causation_id,
        occurred_at: meta.occurred_at,
    }
}

fn metadata_of(stored: &StoredEvent) -> EventMetadata {
    EventMetadata {
        event_id: stored.event_id,
        event_type: stored.event_type.clone(),
        aggregate_id: stored.aggregate_id,
        sequence_number: stored.sequence_number,
        correlation_id: stored.correlation_id,
        causation_id: stored.causation_id,
        occurred_at: stored.occurred_at,
    }
}

fn deserialization_failed(e: &serde_json::Error) -> DomainError {
    DomainError::Infrastructure(format!("event deserialization failed: {e}"))
}

/// Reconstitutes a `Notification` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute_notification(
    notification_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Notification, DomainError> {
    let mut notification = Notification::new(notification_id);
    for stored in existing_events {
        let kind: NotificationEventKind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| deserialization_failed(&e))?;
        notification.apply(&NotificationEvent {
            metadata: metadata_of(stored),
            kind,
        });
    }
    Ok(notification)
}

/// Reconstitutes a `Report` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute_report(
    report_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Report, DomainError> {
    let mut report = Report::new(report_id);
    for stored in existing_events {
        let kind: ReportEventKind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| deserialization_failed(&e))?;
        report.apply(&ReportEvent {
            metadata: metadata_of(stored),
            kind,
        });
    }
    Ok(report)
}

async fn persist<A: AggregateRoot>(
    aggregate: &A,
    repo: &dyn EventRepository,
) -> Result<MessagingCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = aggregate
        .uncommitted_events()
        .iter()
        .map(to_stored_event)
        .collect();

    repo.append_events(aggregate.aggregate_id(), aggregate.version(), &stored_events)
        .await?;

    Ok(MessagingCommandResult {
        aggregate_id: aggregate.aggregate_id(),
        stored_events,
    })
}

/// Handles the `SendNotification` command.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for non-admin actors,
/// `DomainError::Validation` for blank fields or an empty specific audience,
/// and `DomainError::Conflict` if the identifier is taken.
#[instrument(skip(command, clock, repo), fields(notification_id = %command.notification_id))]
pub async fn handle_send_notification(
    command: &SendNotification,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<MessagingCommandResult, DomainError> {
    let existing_events = load_stream(repo, command.notification_id, NOTIFICATION_CATEGORY)
        .await?
        .into_new(command.notification_id)?;
    let mut notification = reconstitute_notification(command.notification_id, &existing_events)?;

    notification.send(
        &command.actor,
        &command.title,
        &command.content,
        command.recipient_type,
        &command.recipient_user_ids,
        command.correlation_id,
        clock,
    )?;

    let result = persist(&notification, repo).await?;
    info!(
        correlation_id = %command.correlation_id,
        recipient_type = ?command.recipient_type,
        "notification sent"
    );
    Ok(result)
}

/// Handles the `SubmitReport` command.
///
/// # Errors
///
/// Returns `DomainError::Authorization` unless the actor is an agency,
/// `DomainError::Conflict` if the report already exists, and
/// `DomainError::Validation` for a blank title or content.
#[instrument(skip(command, clock, repo), fields(report_id = %command.report_id))]
pub async fn handle_submit_report(
    command: &SubmitReport,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<MessagingCommandResult, DomainError> {
    let existing_events = load_stream(repo, command.report_id, REPORT_CATEGORY)
        .await?
        .into_new(command.report_id)?;
    let mut report = reconstitute_report(command.report_id, &existing_events)?;

    report.submit(
        &command.actor,
        &command.title,
        &command.content,
        command.correlation_id,
        clock,
    )?;

    let result = persist(&report, repo).await?;
    info!(
        correlation_id = %command.correlation_id,
        agency_id = %command.actor.actor_id(),
        "report submitted"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rihla_core::actor::ActorContext;
    use rihla_test_support::{FailingEventRepository, FixedClock, InMemoryEventRepository};

    use crate::domain::events::{
        NOTIFICATION_SENT_EVENT_TYPE, REPORT_SUBMITTED_EVENT_TYPE, RecipientType,
    };

    fn maintenance(actor: ActorContext) -> SendNotification {
        SendNotification {
            correlation_id: Uuid::new_v4(),
            actor,
            notification_id: Uuid::new_v4(),
            title: "Maintenance".into(),
            content: "Servers down tonight".into(),
            recipient_type: RecipientType::All,
            recipient_user_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_handle_send_notification_persists_sent_event() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let command = maintenance(ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        });

        // Act
        let result = handle_send_notification(&command, &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.aggregate_id, command.notification_id);
        assert_eq!(
            result.stored_events[0].event_type,
            NOTIFICATION_SENT_EVENT_TYPE
        );
        assert_eq!(
            result.stored_events[0].payload["NotificationSent"]["recipient_type"],
            "all"
        );
        assert_eq!(repo.event_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_send_notification_rejects_client_and_persists_nothing() {
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let command = maintenance(ActorContext::Client {
            client_id: Uuid::new_v4(),
        });

        let result = handle_send_notification(&command, &clock, &repo).await;

        assert!(matches!(result, Err(DomainError::Authorization(_))));
        assert_eq!(repo.event_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_submit_report_by_agency() {
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let command = SubmitReport {
            correlation_id: Uuid::new_v4(),
            actor: ActorContext::Agency {
                agency_id: Uuid::new_v4(),
                city: "Rabat".into(),
            },
            report_id: Uuid::new_v4(),
            title: "Q1".into(),
            content: "Twelve pilgrims served".into(),
        };

        let result = handle_submit_report(&command, &clock, &repo)
            .await
            .unwrap();

        assert_eq!(
            result.stored_events[0].event_type,
            REPORT_SUBMITTED_EVENT_TYPE
        );
        let again = handle_submit_report(&command, &clock, &repo).await;
        assert!(matches!(again, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_handle_send_notification_propagates_repository_error() {
        let clock = FixedClock::standard();
        let command = maintenance(ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        });

        let result = handle_send_notification(&command, &clock, &FailingEventRepository).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_report_cannot_reuse_a_notification_id() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let notification = maintenance(ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        });
        handle_send_notification(&notification, &clock, &repo)
            .await
            .unwrap();
        let command = SubmitReport {
            correlation_id: Uuid::new_v4(),
            actor: ActorContext::Agency {
                agency_id: Uuid::new_v4(),
                city: "Rabat".into(),
            },
            report_id: notification.notification_id,
            title: "Q1".into(),
            content: "Forty pilgrims served".into(),
        };

        // Act
        let result = handle_submit_report(&command, &clock, &repo).await;

        // Assert
        assert!(
            matches!(result, Err(DomainError::Conflict(message)) if message.contains("notification"))
        );
        assert_eq!(repo.event_count(), 1);
    }
}
