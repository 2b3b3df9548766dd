//! Domain layer for the Messaging context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod read_state;
