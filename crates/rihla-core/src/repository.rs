//! Event repository abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::event_category;

/// Stored representation of a domain event.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the aggregate stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Causation ID linking to the causing event/command.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

/// Repository trait for loading and appending domain events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Load all events for a given aggregate, ordered by sequence number.
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError>;

    /// Load every event whose type belongs to `category` (`"<category>.*"`),
    /// across all aggregates, in append order.
    async fn load_category(&self, category: &str) -> Result<Vec<StoredEvent>, DomainError>;

    /// Append new events to an aggregate stream with optimistic concurrency.
    /// `expected_version` is the last known sequence number.
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;
}

/// Splits a category load into per-aggregate streams, keeping the order in
/// which each aggregate first appears and the order of events within it.
#[must_use]
pub fn group_by_aggregate(events: Vec<StoredEvent>) -> Vec<(Uuid, Vec<StoredEvent>)> {
    let mut streams: Vec<(Uuid, Vec<StoredEvent>)> = Vec::new();
    for event in events {
        match streams.iter_mut().find(|(id, _)| *id == event.aggregate_id) {
            Some((_, stream)) => stream.push(event),
            None => streams.push((event.aggregate_id, vec![event])),
        }
    }
    streams
}

/// One aggregate stream, classified against the category the caller expects.
///
/// Every category shares the same id space, so an id can name a record of a
/// different kind.
#[derive(Debug)]
pub enum CategoryStream {
    /// Nothing is stored under the id.
    Empty,
    /// Events of the expected category.
    Found(Vec<StoredEvent>),
    /// The id belongs to a record of this other category.
    Foreign(String),
}

impl CategoryStream {
    /// Returns the events of an existing record.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the stream is empty or belongs to
    /// another category.
    pub fn into_existing(self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        match self {
            Self::Found(events) => Ok(events),
            Self::Empty | Self::Foreign(_) => Err(DomainError::NotFound(aggregate_id)),
        }
    }

    /// Returns the events already stored under an id about to be created;
    /// empty for a fresh id. The aggregate decides whether a non-empty
    /// stream of its own kind is a conflict.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` if the id is taken by another
    /// category.
    pub fn into_new(self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::Found(events) => Ok(events),
            Self::Foreign(category) => Err(DomainError::Conflict(format!(
                "id {aggregate_id} is already used by a {category} record"
            ))),
        }
    }
}

/// Loads the stream of `aggregate_id` and classifies it against `category`.
///
/// # Errors
///
/// Returns any error from [`EventRepository::load_events`].
pub async fn load_stream(
    repo: &dyn EventRepository,
    aggregate_id: Uuid,
    category: &str,
) -> Result<CategoryStream, DomainError> {
    let events = repo.load_events(aggregate_id).await?;
    let Some(first) = events.first() else {
        return Ok(CategoryStream::Empty);
    };
    let found = event_category(&first.event_type);
    if found == category {
        Ok(CategoryStream::Found(events))
    } else {
        Ok(CategoryStream::Foreign(found.to_owned()))
    }
}
