//! Visibility scoping.
//!
//! Decides which clients, reservations and agencies an actor may see. The
//! rules are pure functions over the actor and the current directory state;
//! nothing is cached, so a client's city change is reflected on the very
//! next query.

pub mod access;
pub mod queries;
pub mod rules;
