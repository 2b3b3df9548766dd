//! Explicit actor context.
//!
//! Identity and affiliation are resolved by the authentication layer and
//! handed to every scoped operation as an `ActorContext` value. Domain code
//! never reads ambient credentials.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// The three roles an actor can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A traveler booking reservations.
    Client,
    /// A partner agency serving clients in its city.
    Agency,
    /// A platform administrator.
    Admin,
}

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Agency => "agency",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "agency" => Ok(Self::Agency),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::Authorization(format!("unknown role '{other}'"))),
        }
    }
}

/// The acting identity plus its affiliation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ActorContext {
    /// A traveler, affiliated by its own client id.
    Client {
        /// The client's identifier.
        client_id: Uuid,
    },
    /// A partner agency, affiliated by id and city.
    Agency {
        /// The agency's identifier.
        agency_id: Uuid,
        /// The city the agency operates in.
        city: String,
    },
    /// A platform administrator.
    Admin {
        /// The administrator's identifier.
        admin_id: Uuid,
    },
}

impl ActorContext {
    /// Returns the role held by this actor.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Client { .. } => Role::Client,
            Self::Agency { .. } => Role::Agency,
            Self::Admin { .. } => Role::Admin,
        }
    }

    /// Returns the actor's own identifier.
    #[must_use]
    pub fn actor_id(&self) -> Uuid {
        match self {
            Self::Client { client_id } => *client_id,
            Self::Agency { agency_id, .. } => *agency_id,
            Self::Admin { admin_id } => *admin_id,
        }
    }

    /// Returns `true` for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// Fails with `DomainError::Authorization` unless the actor is an admin.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` for client and agency actors.
    pub fn require_admin(&self, action: &str) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Authorization(format!(
                "{} actors may not {action}",
                self.role()
            )))
        }
    }
}
