//! Pure visibility rules.

use std::collections::HashSet;

use rihla_core::actor::ActorContext;
use rihla_core::error::DomainError;
use rihla_directory::application::query_handlers::ClientView;
use uuid::Uuid;

/// Cities match when equal after trimming surrounding whitespace. Case is
/// significant.
#[must_use]
pub fn same_city(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

/// Whether `actor` may see a client living in `client_city`.
#[must_use]
pub fn client_visible_to(actor: &ActorContext, client_id: Uuid, client_city: &str) -> bool {
    match actor {
        ActorContext::Admin { .. } => true,
        ActorContext::Agency { city, .. } => same_city(city, client_city),
        ActorContext::Client { client_id: own } => *own == client_id,
    }
}

/// Clients may not read agency records at all.
///
/// # Errors
///
/// Returns `DomainError::Authorization` for client actors.
pub fn ensure_may_read_agencies(actor: &ActorContext) -> Result<(), DomainError> {
    match actor {
        ActorContext::Client { .. } => Err(DomainError::Authorization(
            "client actors may not read agency records".to_owned(),
        )),
        ActorContext::Admin { .. } | ActorContext::Agency { .. } => Ok(()),
    }
}

/// Whether `actor` may see the agency record `agency_id`: admins see all,
/// an agency sees itself.
#[must_use]
pub fn agency_visible_to(actor: &ActorContext, agency_id: Uuid) -> bool {
    match actor {
        ActorContext::Admin { .. } => true,
        ActorContext::Agency { agency_id: own, .. } => *own == agency_id,
        ActorContext::Client { .. } => false,
    }
}

/// The set of clients an actor is scoped to, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientScope {
    /// Every client (admins).
    All,
    /// An explicit set of client ids.
    Only(HashSet<Uuid>),
}

impl ClientScope {
    /// Resolves the scope of `actor` against the current client directory.
    #[must_use]
    pub fn resolve(actor: &ActorContext, clients: &[ClientView]) -> Self {
        match actor {
            ActorContext::Admin { .. } => Self::All,
            ActorContext::Client { client_id } => Self::Only(HashSet::from([*client_id])),
            ActorContext::Agency { .. } => Self::Only(
                clients
                    .iter()
                    .filter(|c| client_visible_to(actor, c.id, &c.city))
                    .map(|c| c.id)
                    .collect(),
            ),
        }
    }

    /// Whether `client_id` falls inside the scope.
    #[must_use]
    pub fn includes(&self, client_id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&client_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn client(city: &str) -> ClientView {
        ClientView {
            id: Uuid::new_v4(),
            full_name: "Client".into(),
            email: "client@example.com".into(),
            city: city.into(),
            agency_id: None,
            registration_date: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            version: 1,
        }
    }

    fn agency_in(city: &str) -> ActorContext {
        ActorContext::Agency {
            agency_id: Uuid::new_v4(),
            city: city.into(),
        }
    }

    #[test]
    fn test_rabat_agency_does_not_see_casablanca_client() {
        let casablanca = client("Casablanca");

        assert!(!client_visible_to(
            &agency_in("Rabat"),
            casablanca.id,
            &casablanca.city
        ));
        assert!(client_visible_to(
            &agency_in("Casablanca"),
            casablanca.id,
            &casablanca.city
        ));
    }

    #[test]
    fn test_city_match_trims_but_keeps_case() {
        assert!(same_city(" Rabat ", "Rabat"));
        assert!(!same_city("rabat", "Rabat"));
    }

    #[test]
    fn test_client_sees_only_itself() {
        let own = client("Rabat");
        let actor = ActorContext::Client { client_id: own.id };

        assert!(client_visible_to(&actor, own.id, &own.city));
        assert!(!client_visible_to(&actor, Uuid::new_v4(), "Rabat"));
    }

    #[test]
    fn test_agency_records_are_forbidden_to_clients() {
        let actor = ActorContext::Client {
            client_id: Uuid::new_v4(),
        };

        assert!(matches!(
            ensure_may_read_agencies(&actor),
            Err(DomainError::Authorization(_))
        ));
        assert!(!agency_visible_to(&actor, Uuid::new_v4()));
    }

    #[test]
    fn test_agency_sees_only_itself_among_agencies() {
        let agency_id = Uuid::new_v4();
        let actor = ActorContext::Agency {
            agency_id,
            city: "Rabat".into(),
        };

        assert!(ensure_may_read_agencies(&actor).is_ok());
        assert!(agency_visible_to(&actor, agency_id));
        assert!(!agency_visible_to(&actor, Uuid::new_v4()));
    }

    #[test]
    fn test_scope_resolves_agency_to_same_city_clients() {
        // Arrange
        let rabat = client("Rabat");
        let casablanca = client("Casablanca");
        let clients = vec![rabat.clone(), casablanca.clone()];

        // Act
        let scope = ClientScope::resolve(&agency_in("Rabat"), &clients);

        // Assert
        assert!(scope.includes(rabat.id));
        assert!(!scope.includes(casablanca.id));
        assert_eq!(
            ClientScope::resolve(
                &ActorContext::Admin {
                    admin_id: Uuid::new_v4()
                },
                &clients
            ),
            ClientScope::All
        );
    }
}
