//! Domain model for the Reservation context.

pub mod access;
pub mod aggregates;
pub mod commands;
pub mod documents;
pub mod draft;
pub mod events;
pub mod lifecycle;
pub mod package;
pub mod traveler;
