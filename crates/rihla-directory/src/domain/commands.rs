//! Commands for the Directory context.

use rihla_core::actor::ActorContext;
use rihla_core::command::Command;
use uuid::Uuid;

/// Command to register a client record.
#[derive(Debug, Clone)]
pub struct RegisterClient {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The client registering itself, or an admin.
    pub actor: ActorContext,
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

/// Command to move a client to another city.
#[derive(Debug, Clone)]
pub struct ChangeClientCity {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The client itself, or an admin.
    pub actor: ActorContext,
    /// The client identifier.
    pub client_id: Uuid,
    /// The new city.
    pub city: String,
}

/// Command to register an agency record.
#[derive(Debug, Clone)]
pub struct RegisterAgency {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The acting admin.
    pub actor: ActorContext,
    /// The agency identifier.
    pub agency_id: Uuid,
    /// Trading name.
    pub name: String,
    /// City the agency operates in.
    pub city: String,
}

impl Command for RegisterClient {
    fn command_type(&self) -> &'static str {
        "directory.register_client"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ActorContext {
        &self.actor
    }
}

impl Command for ChangeClientCity {
    fn command_type(&self) -> &'static str {
        "directory.change_client_city"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ActorContext {
        &self.actor
    }
}

impl Command for RegisterAgency {
    fn command_type(&self) -> &'static str {
        "directory.register_agency"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor(&self) -> &ActorContext {
        &self.actor
    }
}
