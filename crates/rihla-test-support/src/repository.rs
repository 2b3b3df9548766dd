//! Test repositories — mock `EventRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rihla_core::error::DomainError;
use rihla_core::event::event_category;
use rihla_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Streams {
    /// Events in global append order.
    log: Vec<StoredEvent>,
    /// Current version per aggregate.
    versions: HashMap<Uuid, i64>,
    /// Every accepted `append_events` call.
    appended: Vec<(Uuid, i64, Vec<StoredEvent>)>,
}

/// An in-memory event store. Enforces `expected_version` the same way the
/// PostgreSQL store does and records every accepted append, so tests can
/// exercise multi-step flows and optimistic concurrency without a database.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: Mutex<Streams>,
}

impl InMemoryEventRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `events`, bypassing the
    /// expected-version check.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_events(events: Vec<StoredEvent>) -> Self {
        let repo = Self::new();
        {
            let mut streams = repo.streams.lock().unwrap();
            for event in events {
                let version = streams.versions.entry(event.aggregate_id).or_insert(0);
                *version = (*version).max(event.sequence_number);
                streams.log.push(event);
            }
        }
        repo
    }

    /// Returns a snapshot of all accepted appends as
    /// `(aggregate_id, expected_version, events)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.streams.lock().unwrap().appended.clone()
    }

    /// Returns the number of events stored across all aggregates.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn event_count(&self) -> usize {
        self.streams.lock().unwrap().log.len()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.lock().unwrap();
        let mut events: Vec<StoredEvent> = streams
            .log
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.sequence_number);
        Ok(events)
    }

    async fn load_category(&self, category: &str) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.lock().unwrap();
        Ok(streams
            .log
            .iter()
            .filter(|e| event_category(&e.event_type) == category)
            .cloned()
            .collect())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut streams = self.streams.lock().unwrap();
        let actual = streams.versions.get(&aggregate_id).copied().unwrap_or(0);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }
        let last = events
            .iter()
            .map(|e| e.sequence_number)
            .max()
            .unwrap_or(actual);
        streams.versions.insert(aggregate_id, last);
        streams.log.extend_from_slice(events);
        streams
            .appended
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }
}

/// An event repository that always returns an empty event list and silently
/// accepts appends. Useful for testing "not found" scenarios and creation
/// commands.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn load_category(&self, _category: &str) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

/// An event repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn load_category(&self, _category: &str) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_now;

    fn event(aggregate_id: Uuid, event_type: &str, sequence_number: i64) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id,
            event_type: event_type.to_owned(),
            payload: serde_json::json!({}),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn test_append_rejects_stale_expected_version() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let id = Uuid::new_v4();
        repo.append_events(id, 0, &[event(id, "client.registered", 1)])
            .await
            .unwrap();

        // Act
        let result = repo
            .append_events(id, 0, &[event(id, "client.city_changed", 1)])
            .await;

        // Assert
        match result.unwrap_err() {
            DomainError::ConcurrencyConflict {
                expected, actual, ..
            } => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
        assert_eq!(repo.event_count(), 1);
    }

    #[tokio::test]
    async fn test_load_category_filters_by_type_prefix() {
        // Arrange
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let repo = InMemoryEventRepository::with_events(vec![
            event(a, "client.registered", 1),
            event(b, "agency.registered", 1),
            event(a, "client.city_changed", 2),
        ]);

        // Act
        let clients = repo.load_category("client").await.unwrap();

        // Assert
        assert_eq!(clients.len(), 2);
        assert!(clients.iter().all(|e| e.aggregate_id == a));
    }
}
