//! Reservation status state machine.
//!
//! ```text
//! pending ──► confirmed
//!    │
//!    └──────► cancelled
//! ```
//!
//! Both targets are terminal. Only agency and admin actors move a
//! reservation; clients can only create it.

use std::fmt;

use rihla_core::actor::{ActorContext, Role};
use rihla_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Submitted, awaiting a decision.
    #[default]
    Pending,
    /// Accepted by an agency or admin.
    Confirmed,
    /// Cancelled; records are never deleted.
    Cancelled,
}

impl ReservationStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Confirmed and cancelled reservations accept no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing switches for the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecyclePolicy {
    /// Refuse to confirm a reservation until all four document slots exist.
    /// Off by default: completeness is informational only.
    pub require_complete_documents: bool,
}

/// Checks that `actor` may move reservation `reservation_id` from `from` to
/// `to`. Affiliation (which agency may act on which reservation) is checked
/// separately by the caller.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for client actors and
/// `DomainError::Conflict` for transitions out of a terminal state or back to
/// pending.
pub fn check_transition(
    actor: &ActorContext,
    reservation_id: Uuid,
    from: ReservationStatus,
    to: ReservationStatus,
) -> Result<(), DomainError> {
    if actor.role() == Role::Client {
        return Err(DomainError::Authorization(
            "client actors may not change reservation status".into(),
        ));
    }
    if to == ReservationStatus::Pending {
        return Err(DomainError::Conflict(format!(
            "reservation {reservation_id} cannot return to pending"
        )));
    }
    if from.is_terminal() {
        return Err(DomainError::Conflict(format!(
            "reservation {reservation_id} is already {from} and cannot become {to}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agency() -> ActorContext {
        ActorContext::Agency {
            agency_id: Uuid::new_v4(),
            city: "Rabat".into(),
        }
    }

    #[test]
    fn test_pending_moves_to_either_terminal_state() {
        let id = Uuid::new_v4();
        for to in [ReservationStatus::Confirmed, ReservationStatus::Cancelled] {
            assert!(check_transition(&agency(), id, ReservationStatus::Pending, to).is_ok());
        }
    }

    #[test]
    fn test_terminal_states_reject_every_transition() {
        let id = Uuid::new_v4();
        let admin = ActorContext::Admin {
            admin_id: Uuid::new_v4(),
        };
        for from in [ReservationStatus::Confirmed, ReservationStatus::Cancelled] {
            for to in [
                ReservationStatus::Pending,
                ReservationStatus::Confirmed,
                ReservationStatus::Cancelled,
            ] {
                let result = check_transition(&admin, id, from, to);
                assert!(
                    matches!(result, Err(DomainError::Conflict(_))),
                    "{from} -> {to} gave {result:?}"
                );
            }
        }
    }

    #[test]
    fn test_clients_cannot_transition() {
        let client = ActorContext::Client {
            client_id: Uuid::new_v4(),
        };

        let result = check_transition(
            &client,
            Uuid::new_v4(),
            ReservationStatus::Pending,
            ReservationStatus::Cancelled,
        );

        assert!(matches!(result, Err(DomainError::Authorization(_))));
    }

    #[test]
    fn test_conflict_message_names_current_and_target_state() {
        let id = Uuid::new_v4();

        let err = check_transition(
            &agency(),
            id,
            ReservationStatus::Cancelled,
            ReservationStatus::Confirmed,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("conflict: reservation {id} is already cancelled and cannot become confirmed")
        );
    }
}
