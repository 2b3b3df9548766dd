//! Rihla — Reservation bounded context.
//!
//! Responsible for reservation drafts and their validation, the document
//! slots attached to each reservation, and the status lifecycle.

pub mod application;
pub mod domain;
