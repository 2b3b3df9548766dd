//! Domain layer for the Directory context.

pub mod aggregates;
pub mod commands;
pub mod events;
