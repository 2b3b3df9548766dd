//! Messaging bounded context.
//!
//! Admin notifications fanned out to clients at read time, and one-shot
//! reports submitted by agencies.

pub mod application;
pub mod domain;
