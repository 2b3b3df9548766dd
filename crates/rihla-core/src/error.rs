//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A record with the given identifier does not exist.
    #[error("not found: {0}")]
    NotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// One or more required fields are missing or malformed.
    #[error("validation error: {message} [{}]", fields.join(", "))]
    Validation {
        /// Human-readable description of the violated rule.
        message: String,
        /// Every offending field, in declaration order.
        fields: Vec<String>,
    },

    /// An illegal state transition was requested.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The actor lacks the role or affiliation required for the operation.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// An unknown document slot key was supplied.
    #[error("invalid document slot: {0}")]
    InvalidSlot(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Builds a validation error for a set of offending fields.
    #[must_use]
    pub fn invalid_fields<I, S>(message: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            message: message.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Fails with a validation error naming every `(field, value)` pair whose
    /// value is empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if any value is blank.
    pub fn require_non_blank(fields: &[(&str, &str)]) -> Result<(), Self> {
        let blank: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if blank.is_empty() {
            Ok(())
        } else {
            Err(Self::invalid_fields("required fields are blank", blank))
        }
    }

    /// Returns the offending field names if this is a validation error.
    #[must_use]
    pub fn fields(&self) -> Option<&[String]> {
        match self {
            Self::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }
}
