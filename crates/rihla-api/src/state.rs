//! Shared application state.

use std::sync::Arc;

use rihla_core::clock::Clock;
use rihla_core::repository::EventRepository;
use rihla_reservation::domain::lifecycle::LifecyclePolicy;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to timestamp events.
    pub clock: Arc<dyn Clock>,
    /// Event store backing every context.
    pub event_repository: Arc<dyn EventRepository>,
    /// Lifecycle switches.
    pub policy: LifecyclePolicy,
    /// Length of the dashboard's recent-item feeds.
    pub recent_limit: usize,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_repository: Arc<dyn EventRepository>,
        policy: LifecyclePolicy,
        recent_limit: usize,
    ) -> Self {
        Self {
            clock,
            event_repository,
            policy,
            recent_limit,
        }
    }
}
