//! Domain events for the Directory context.

use rihla_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type name for `ClientRegistered`.
pub const CLIENT_REGISTERED_EVENT_TYPE: &str = "client.registered";
/// Event type name for `ClientCityChanged`.
pub const CLIENT_CITY_CHANGED_EVENT_TYPE: &str = "client.city_changed";
/// Event type name for `AgencyRegistered`.
pub const AGENCY_REGISTERED_EVENT_TYPE: &str = "agency.registered";

/// Emitted when a client record is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRegistered {
    /// The client identifier.
    pub client_id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Contact e-mail.
    pub email: String,
    /// City of residence.
    pub city: String,
    /// Agency the client signed up through, if any.
    pub agency_id: Option<Uuid>,
}

/// Emitted when a client moves to another city.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCityChanged {
    /// The client identifier.
    pub client_id: Uuid,
    /// City before the change.
    pub previous_city: String,
    /// City after the change.
    pub city: String,
}

/// Emitted when an agency record is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgencyRegistered {
    /// The agency identifier.
    pub agency_id: Uuid,
    /// Trading name.
    pub name: String,
    /// City the agency operates in.
    pub city: String,
}

/// Event payload variants for client records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientEventKind {
    /// A client has registered.
    ClientRegistered(ClientRegistered),
    /// A client's city has changed.
    ClientCityChanged(ClientCityChanged),
}

/// Event payload variants for agency records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgencyEventKind {
    /// An agency has been registered.
    AgencyRegistered(AgencyRegistered),
}

/// Domain event envelope for client records.
#[derive(Debug, Clone)]
pub struct ClientEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ClientEventKind,
}

/// Domain event envelope for agency records.
#[derive(Debug, Clone)]
pub struct AgencyEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: AgencyEventKind,
}

impl DomainEvent for ClientEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ClientEventKind::ClientRegistered(_) => CLIENT_REGISTERED_EVENT_TYPE,
            ClientEventKind::ClientCityChanged(_) => CLIENT_CITY_CHANGED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("ClientEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

impl DomainEvent for AgencyEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            AgencyEventKind::AgencyRegistered(_) => AGENCY_REGISTERED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("AgencyEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
