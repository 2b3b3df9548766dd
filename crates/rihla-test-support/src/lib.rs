//! Shared test mocks and utilities for the Rihla reservation engine.

mod clock;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use repository::{EmptyEventRepository, FailingEventRepository, InMemoryEventRepository};
