//! Aggregate roots for the Directory context.

use chrono::{DateTime, Utc};
use rihla_core::actor::ActorContext;
use rihla_core::aggregate::AggregateRoot;
use rihla_core::clock::Clock;
use rihla_core::error::DomainError;
use rihla_core::event::EventMetadata;
use uuid::Uuid;

use super::events::{
    AGENCY_REGISTERED_EVENT_TYPE, AgencyEvent, AgencyEventKind, AgencyRegistered,
    CLIENT_CITY_CHANGED_EVENT_TYPE, CLIENT_REGISTERED_EVENT_TYPE, ClientCityChanged, ClientEvent,
    ClientEventKind, ClientRegistered,
};

/// Only the client itself or an admin may write a client record.
fn ensure_self_or_admin(actor: &ActorContext, client_id: Uuid) -> Result<(), DomainError> {
    match actor {
        ActorContext::Admin { .. } => Ok(()),
        ActorContext::Client { client_id: own } if *own == client_id => Ok(()),
        _ => Err(DomainError::Authorization(format!(
            "{} {} may not modify client {client_id}",
            actor.role(),
            actor.actor_id()
        ))),
    }
}

fn metadata(
    event_type: &str,
    aggregate_id: Uuid,
    sequence_number: i64,
    correlation_id: Uuid,
    clock: &dyn Clock,
) -> EventMetadata {
    EventMetadata {
        event_id: Uuid::new_v4(),
        event_type: event_type.to_owned(),
        aggregate_id,
        sequence_number,
        correlation_id,
        causation_id: correlation_id,
        occurred_at: clock.now(),
    }
}

/// The aggregate root for a client record.
#[derive(Debug)]
pub struct Client {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Full name.
    pub(crate) full_name: String,
    /// Contact e-mail.
    pub(crate) email: String,
    /// Current city, trimmed.
    pub(crate) city: String,
    /// Agency the client signed up through.
    pub(crate) agency_id: Option<Uuid>,
    /// When the client registered; `None` until registered.
    pub(crate) registered_at: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ClientEvent>,
}

impl Client {
    /// Creates an empty client shell.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            full_name: String::new(),
            email: String::new(),
            city: String::new(),
            agency_id: None,
            registered_at: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns `true` once a `ClientRegistered` event has been applied.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered_at.is_some()
    }

    /// Returns the client's current city.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    /// Registers the client, producing a `ClientRegistered` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` unless `actor` is this client or
    /// an admin, `DomainError::Conflict` if already registered, and
    /// `DomainError::Validation` for blank fields or a malformed e-mail.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &mut self,
        actor: &ActorContext,
        full_name: &str,
        email: &str,
        city: &str,
        agency_id: Option<Uuid>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        ensure_self_or_admin(actor, self.id)?;
        if self.is_registered() {
            return Err(DomainError::Conflict(format!(
                "client {} is already registered",
                self.id
            )));
        }
        let mut invalid: Vec<&str> = [("fullName", full_name), ("email", email), ("city", city)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();
        if !email.trim().is_empty() && !email.contains('@') {
            invalid.push("email");
        }
        if !invalid.is_empty() {
            return Err(DomainError::invalid_fields(
                "client fields are missing or malformed",
                invalid,
            ));
        }

        let event = ClientEvent {
            metadata: metadata(
                CLIENT_REGISTERED_EVENT_TYPE,
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock,
            ),
            kind: ClientEventKind::ClientRegistered(ClientRegistered {
                client_id: self.id,
                full_name: full_name.trim().to_owned(),
                email: email.trim().to_owned(),
                city: city.trim().to_owned(),
                agency_id,
            }),
        };
        self.uncommitted_events.push(event);
        Ok(())
    }

    /// Moves the client to `city`, producing a `ClientCityChanged` event.
    /// Moving to the current city produces nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` unless `actor` is this client or
    /// an admin, and `DomainError::Validation` if `city` is blank.
    pub fn change_city(
        &mut self,
        actor: &ActorContext,
        city: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        ensure_self_or_admin(actor, self.id)?;
        DomainError::require_non_blank(&[("city", city)])?;
        let city = city.trim();
        if city == self.city {
            return Ok(());
        }

        let event = ClientEvent {
            metadata: metadata(
                CLIENT_CITY_CHANGED_EVENT_TYPE,
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock,
            ),
            kind: ClientEventKind::ClientCityChanged(ClientCityChanged {
                client_id: self.id,
                previous_city: self.city.clone(),
                city: city.to_owned(),
            }),
        };
        self.uncommitted_events.push(event);
        Ok(())
    }
}

impl AggregateRoot for Client {
    type Event = ClientEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            ClientEventKind::ClientRegistered(payload) => {
                self.full_name.clone_from(&payload.full_name);
                self.email.clone_from(&payload.email);
                self.city.clone_from(&payload.city);
                self.agency_id = payload.agency_id;
                self.registered_at = Some(event.metadata.occurred_at);
            }
            ClientEventKind::ClientCityChanged(payload) => {
                self.city.clone_from(&payload.city);
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

/// The aggregate root for an agency record.
#[derive(Debug)]
pub struct Agency {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Trading name.
    pub(crate) name: String,
    /// City the agency operates in, trimmed.
    pub(crate) city: String,
    /// When the agency was registered.
    pub(crate) registered_at: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<AgencyEvent>,
}

impl Agency {
    /// Creates an empty agency shell.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            name: String::new(),
            city: String::new(),
            registered_at: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns `true` once an `AgencyRegistered` event has been applied.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered_at.is_some()
    }

    /// Registers the agency, producing an `AgencyRegistered` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` for non-admin actors,
    /// `DomainError::Conflict` if already registered, and
    /// `DomainError::Validation` for a blank name or city.
    pub fn register(
        &mut self,
        actor: &ActorContext,
        name: &str,
        city: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        actor.require_admin("register agencies")?;
        if self.is_registered() {
            return Err(DomainError::Conflict(format!(
                "agency {} is already registered",
                self.id
            )));
        }
        DomainError::require_non_blank(&[("name", name), ("city", city)])?;

        #[allow(clippy::cast_possible_wrap)]
        let sequence_number = self.version + self.uncommitted_events.len() as i64 + 1;
        let event = AgencyEvent {
            metadata: metadata(
                AGENCY_REGISTERED_EVENT_TYPE,
                self.id,
                sequence_number,
                correlation_id,
                clock,
            ),
            kind: AgencyEventKind::AgencyRegistered(AgencyRegistered {
                agency_id: self.id,
                name: name.trim().to_owned(),
                city: city.trim().to_owned(),
            }),
        };
        self.uncommitted_events.push(event);
        Ok(())
    }
}

impl AggregateRoot for Agency {
    type Event = AgencyEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            AgencyEventKind::AgencyRegistered(payload) => {
                self.name.clone_from(&payload.name);
                self.city.clone_from(&payload.city);
                self.registered_at = Some(event.metadata.occurred_at);
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
