//! Actor extraction from trusted identity headers.
//!
//! The authentication proxy in front of the API resolves credentials and
//! forwards the result as `x-actor-id`, `x-actor-role` and, for agencies,
//! `x-agency-city`. This module only turns those headers into an
//! [`ActorContext`].

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use rihla_core::actor::{ActorContext, Role};
use rihla_core::error::DomainError;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the actor's identifier.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the actor's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Header carrying an agency's city.
pub const AGENCY_CITY_HEADER: &str = "x-agency-city";

/// Extractor for the calling actor. Missing or malformed headers reject the
/// request with 403.
#[derive(Debug, Clone)]
pub struct Actor(pub ActorContext);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(Self).map_err(ApiError)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, DomainError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::Authorization(format!("missing {name} header")))
}

/// Builds the actor context from identity headers.
///
/// # Errors
///
/// Returns `DomainError::Authorization` if a required header is missing or
/// malformed.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<ActorContext, DomainError> {
    let id: Uuid = header(headers, ACTOR_ID_HEADER)?
        .parse()
        .map_err(|_| DomainError::Authorization(format!("{ACTOR_ID_HEADER} is not a uuid")))?;
    let role: Role = header(headers, ACTOR_ROLE_HEADER)?.parse()?;

    Ok(match role {
        Role::Client => ActorContext::Client { client_id: id },
        Role::Admin => ActorContext::Admin { admin_id: id },
        Role::Agency => ActorContext::Agency {
            agency_id: id,
            city: header(headers, AGENCY_CITY_HEADER)?.to_owned(),
        },
    })
}
