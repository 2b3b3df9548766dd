//! Dashboard statistics.
//!
//! Counts and recent-item feeds are recomputed from the event store on every
//! request and scoped with the same rules as the list endpoints. Nothing is
//! cached.

pub mod stats;
