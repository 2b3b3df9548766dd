//! Directory bounded context.
//!
//! Holds the client and agency records that visibility scoping joins on.
//! A client's city is the only affiliation key; agencies never store the
//! set of clients they serve.

pub mod application;
pub mod domain;
