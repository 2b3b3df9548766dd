//! Query handlers for the Messaging context.
//!
//! A client's feed is resolved at read time by filtering every notification
//! on its audience; nothing is fanned out on write.

use chrono::{DateTime, Utc};
use rihla_core::actor::ActorContext;
use rihla_core::error::DomainError;
use rihla_core::repository::{EventRepository, group_by_aggregate, load_stream};
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers::{reconstitute_notification, reconstitute_report};
use crate::domain::events::RecipientType;

/// Category under which notification events are stored.
pub const NOTIFICATION_CATEGORY: &str = "notification";
/// Category under which report events are stored.
pub const REPORT_CATEGORY: &str = "report";

/// Read-only view of a notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    /// The notification identifier.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Audience selector.
    pub recipient_type: RecipientType,
    /// Recipients; empty for `all`.
    pub recipient_user_ids: Vec<Uuid>,
    /// Send time.
    pub sent_at: DateTime<Utc>,
}

impl NotificationView {
    /// `true` if the notification belongs in `client_id`'s feed.
    #[must_use]
    pub fn is_addressed_to(&self, client_id: Uuid) -> bool {
        match self.recipient_type {
            RecipientType::All => true,
            RecipientType::Specific => self.recipient_user_ids.contains(&client_id),
        }
    }
}

/// Read-only view of an agency report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    /// The report identifier.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Submitting agency.
    pub agency_id: Uuid,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

/// Loads every notification, newest first, without any scoping.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if loading or deserialization fails.
pub async fn all_notifications(
    repo: &dyn EventRepository,
) -> Result<Vec<NotificationView>, DomainError> {
    let events = repo.load_category(NOTIFICATION_CATEGORY).await?;
    let mut views = Vec::new();
    for (notification_id, stream) in group_by_aggregate(events) {
        let notification = reconstitute_notification(notification_id, &stream)?;
        if let Some(sent_at) = notification.sent_at {
            views.push(NotificationView {
                id: notification.id,
                title: notification.title,
                content: notification.content,
                recipient_type: notification.recipient_type,
                recipient_user_ids: notification.recipient_user_ids,
                sent_at,
            });
        }
    }
    views.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
    Ok(views)
}

/// Lists every notification for an admin, newest first.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for non-admin actors.
pub async fn list_notifications(
    actor: &ActorContext,
    repo: &dyn EventRepository,
) -> Result<Vec<NotificationView>, DomainError> {
    actor.require_admin("list all notifications")?;
    all_notifications(repo).await
}

/// Returns the feed of `client_id`: notifications addressed to everyone or
/// listing the client, newest first.
///
/// # Errors
///
/// Returns `DomainError::Authorization` if a client asks for another
/// client's feed or an agency asks for any feed.
pub async fn get_feed(
    actor: &ActorContext,
    client_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Vec<NotificationView>, DomainError> {
    match actor {
        ActorContext::Admin { .. } => {}
        ActorContext::Client { client_id: own } if *own == client_id => {}
        _ => {
            return Err(DomainError::Authorization(format!(
                "{} {} may not read the feed of client {client_id}",
                actor.role(),
                actor.actor_id()
            )));
        }
    }
    let mut feed = all_notifications(repo).await?;
    feed.retain(|n| n.is_addressed_to(client_id));
    Ok(feed)
}

async fn all_reports(repo: &dyn EventRepository) -> Result<Vec<ReportView>, DomainError> {
    let events = repo.load_category(REPORT_CATEGORY).await?;
    let mut views = Vec::new();
    for (report_id, stream) in group_by_aggregate(events) {
        let report = reconstitute_report(report_id, &stream)?;
        if let (Some(agency_id), Some(submitted_at)) = (report.agency_id, report.submitted_at) {
            views.push(ReportView {
                id: report.id,
                title: report.title,
                content: report.content,
                agency_id,
                submitted_at,
            });
        }
    }
    views.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(views)
}

/// Lists reports newest first: all of them for an admin, its own for an
/// agency.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for client actors.
pub async fn list_reports(
    actor: &ActorContext,
    repo: &dyn EventRepository,
) -> Result<Vec<ReportView>, DomainError> {
    let mut reports = match actor {
        ActorContext::Client { .. } => {
            return Err(DomainError::Authorization(
                "client actors may not read reports".to_owned(),
            ));
        }
        ActorContext::Admin { .. } | ActorContext::Agency { .. } => all_reports(repo).await?,
    };
    if let ActorContext::Agency { agency_id, .. } = actor {
        reports.retain(|r| r.agency_id == *agency_id);
    }
    Ok(reports)
}

/// Retrieves a single report.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown report and
/// `DomainError::Authorization` for clients or for an agency reading another
/// agency's report.
pub async fn get_report(
    actor: &ActorContext,
    report_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<ReportView, DomainError> {
    if let ActorContext::Client { .. } = actor {
        return Err(DomainError::Authorization(
            "client actors may not read reports".to_owned(),
        ));
    }
    let stored_events = load_stream(repo, report_id, REPORT_CATEGORY)
        .await?
        .into_existing(report_id)?;
    let report = reconstitute_report(report_id, &stored_events)?;
    let (Some(agency_id), Some(submitted_at)) = (report.agency_id, report.submitted_at) else {
        return Err(DomainError::NotFound(report_id));
    };
    match actor {
        ActorContext::Agency { agency_id: own, .. } if *own != agency_id => {
            return Err(DomainError::Authorization(format!(
                "agency {own} may not read report {report_id}"
            )));
        }
        _ => {}
    }
    Ok(ReportView {
        id: report.id,
        title: report.title,
        content: report.content,
        agency_id,
        submitted_at,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rihla_test_support::{FixedClock, InMemoryEventRepository};

    use super::*;
    use crate::application::command_handlers::{handle_send_notification, handle_submit_report};
    use crate::domain::commands::{SendNotification, SubmitReport};

    fn admin() -> ActorContext {
        ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        }
    }

    fn agency() -> ActorContext {
        ActorContext::Agency {
            agency_id: Uuid::new_v4(),
            city: "Rabat".into(),
        }
    }

    async fn send(
        recipient_type: RecipientType,
        recipients: Vec<Uuid>,
        clock: &FixedClock,
        repo: &InMemoryEventRepository,
    ) -> Uuid {
        let command = SendNotification {
            correlation_id: Uuid::new_v4(),
            actor: admin(),
            notification_id: Uuid::new_v4(),
            title: "Maintenance".into(),
            content: "Servers down tonight".into(),
            recipient_type,
            recipient_user_ids: recipients,
        };
        handle_send_notification(&command, clock, repo)
            .await
            .unwrap()
            .aggregate_id
    }

    async fn submit_report(
        actor: &ActorContext,
        clock: &FixedClock,
        repo: &InMemoryEventRepository,
    ) -> Uuid {
        let command = SubmitReport {
            correlation_id: Uuid::new_v4(),
            actor: actor.clone(),
            report_id: Uuid::new_v4(),
            title: "Q1".into(),
            content: "Summary".into(),
        };
        handle_submit_report(&command, clock, repo)
            .await
            .unwrap()
            .aggregate_id
    }

    #[tokio::test]
    async fn test_notification_to_all_reaches_every_client_feed() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let notification_id = send(RecipientType::All, Vec::new(), &clock, &repo).await;
        let clients = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

        // Act / Assert
        for client_id in clients {
            let feed = get_feed(&ActorContext::Client { client_id }, client_id, &repo)
                .await
                .unwrap();
            assert_eq!(feed.len(), 1);
            assert_eq!(feed[0].id, notification_id);
            assert_eq!(feed[0].title, "Maintenance");
        }
    }

    #[tokio::test]
    async fn test_specific_notification_reaches_only_listed_clients() {
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let listed = Uuid::new_v4();
        let other = Uuid::new_v4();
        send(RecipientType::Specific, vec![listed], &clock, &repo).await;

        let listed_feed = get_feed(&admin(), listed, &repo).await.unwrap();
        let other_feed = get_feed(&admin(), other, &repo).await.unwrap();

        assert_eq!(listed_feed.len(), 1);
        assert!(other_feed.is_empty());
    }

    #[tokio::test]
    async fn test_feed_is_newest_first() {
        let repo = InMemoryEventRepository::new();
        let earlier = FixedClock::standard();
        let later = FixedClock(earlier.0 + Duration::minutes(5));
        let client_id = Uuid::new_v4();
        let first = send(RecipientType::All, Vec::new(), &earlier, &repo).await;
        let second = send(RecipientType::Specific, vec![client_id], &later, &repo).await;

        let feed = get_feed(&ActorContext::Client { client_id }, client_id, &repo)
            .await
            .unwrap();

        let ids: Vec<Uuid> = feed.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_feed_access_rules() {
        let repo = InMemoryEventRepository::new();
        let client_id = Uuid::new_v4();

        let other_client = get_feed(
            &ActorContext::Client {
                client_id: Uuid::new_v4(),
            },
            client_id,
            &repo,
        )
        .await;
        let agency_read = get_feed(&agency(), client_id, &repo).await;

        assert!(matches!(other_client, Err(DomainError::Authorization(_))));
        assert!(matches!(agency_read, Err(DomainError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_list_notifications_is_admin_only() {
        let repo = InMemoryEventRepository::new();
        let client_id = Uuid::new_v4();

        let result = list_notifications(&ActorContext::Client { client_id }, &repo).await;

        assert!(matches!(result, Err(DomainError::Authorization(_))));
        assert!(list_notifications(&admin(), &repo).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_agency_lists_only_its_own_reports() {
        // Arrange
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let ours = agency();
        let theirs = agency();
        let own_report = submit_report(&ours, &clock, &repo).await;
        let foreign_report = submit_report(&theirs, &clock, &repo).await;

        // Act
        let listed = list_reports(&ours, &repo).await.unwrap();
        let all = list_reports(&admin(), &repo).await.unwrap();
        let foreign = get_report(&ours, foreign_report, &repo).await;

        // Assert
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, own_report);
        assert_eq!(all.len(), 2);
        assert!(matches!(foreign, Err(DomainError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_get_report_not_found_and_client_denied() {
        let repo = InMemoryEventRepository::new();
        let report_id = Uuid::new_v4();

        let missing = get_report(&admin(), report_id, &repo).await;
        let client = get_report(
            &ActorContext::Client {
                client_id: Uuid::new_v4(),
            },
            report_id,
            &repo,
        )
        .await;

        assert!(matches!(missing, Err(DomainError::NotFound(id)) if id == report_id));
        assert!(matches!(client, Err(DomainError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_get_report_with_a_notification_id_is_not_found() {
        let clock = FixedClock::standard();
        let repo = InMemoryEventRepository::new();
        let notification_id = send(RecipientType::All, Vec::new(), &clock, &repo).await;

        let result = get_report(&admin(), notification_id, &repo).await;

        assert!(matches!(result, Err(DomainError::NotFound(id)) if id == notification_id));
    }
}
