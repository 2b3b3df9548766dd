//! Rihla Event Store — PostgreSQL persistence for domain events.

pub mod pg_event_repository;
