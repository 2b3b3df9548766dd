//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use rihla_core::error::DomainError;
use rihla_core::repository::{EventRepository, StoredEvent};

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(err: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

fn row_to_event(row: &PgRow) -> Result<StoredEvent, DomainError> {
    Ok(StoredEvent {
        event_id: row.try_get("event_id").map_err(|e| infrastructure(&e))?,
        aggregate_id: row.try_get("aggregate_id").map_err(|e| infrastructure(&e))?,
        event_type: row.try_get("event_type").map_err(|e| infrastructure(&e))?,
        payload: row.try_get("payload").map_err(|e| infrastructure(&e))?,
        sequence_number: row
            .try_get("sequence_number")
            .map_err(|e| infrastructure(&e))?,
        correlation_id: row
            .try_get("correlation_id")
            .map_err(|e| infrastructure(&e))?,
        causation_id: row.try_get("causation_id").map_err(|e| infrastructure(&e))?,
        occurred_at: row.try_get("occurred_at").map_err(|e| infrastructure(&e))?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let rows = sqlx::query(
            "SELECT event_id, aggregate_id, event_type, payload, sequence_number, \
             correlation_id, causation_id, occurred_at FROM domain_events \
             WHERE aggregate_id = $1 ORDER BY sequence_number ASC",
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        rows.iter().map(row_to_event).collect()
    }

    async fn load_category(&self, category: &str) -> Result<Vec<StoredEvent>, DomainError> {
        let rows = sqlx::query(
            "SELECT event_id, aggregate_id, event_type, payload, sequence_number, \
             correlation_id, causation_id, occurred_at FROM domain_events \
             WHERE event_type LIKE $1 ORDER BY global_position ASC",
        )
        .bind(format!("{category}.%"))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        debug!(category, count = rows.len(), "loaded event category");
        rows.iter().map(row_to_event).collect()
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| infrastructure(&e))?;

        let actual: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(sequence_number) FROM domain_events WHERE aggregate_id = $1",
        )
        .bind(aggregate_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| infrastructure(&e))?;
        let actual = actual.unwrap_or(0);

        if actual != expected_version {
            warn!(%aggregate_id, expected_version, actual, "stale append rejected");
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            sqlx::query(
                "INSERT INTO domain_events \
                 (event_id, aggregate_id, event_type, payload, sequence_number, \
                  correlation_id, causation_id, occurred_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(event.event_id)
            .bind(event.aggregate_id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.sequence_number)
            .bind(event.correlation_id)
            .bind(event.causation_id)
            .bind(event.occurred_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // A concurrent writer committed the same sequence number
                // between our version check and this insert.
                if is_unique_violation(&e) {
                    DomainError::ConcurrencyConflict {
                        aggregate_id,
                        expected: expected_version,
                        actual: event.sequence_number,
                    }
                } else {
                    infrastructure(&e)
                }
            })?;
        }

        tx.commit().await.map_err(|e| infrastructure(&e))?;
        Ok(())
    }
}
