//! Route modules organized by bounded context.

pub mod agencies;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod reservations;

use rihla_core::repository::StoredEvent;
use serde::Serialize;
use uuid::Uuid;

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    /// The aggregate the command acted on.
    pub id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
    /// Version after the write, for aggregates that expose one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl CommandResponse {
    pub(crate) fn new(id: Uuid, stored_events: &[StoredEvent]) -> Self {
        Self {
            id,
            event_ids: stored_events.iter().map(|e| e.event_id).collect(),
            version: None,
        }
    }

    pub(crate) fn with_version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }
}
