//! Application services for the Reservation context.

pub mod command_handlers;
pub mod query_handlers;
