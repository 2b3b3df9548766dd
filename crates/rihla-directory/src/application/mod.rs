//! Application layer for the Directory context.

pub mod command_handlers;
pub mod query_handlers;
