//! Shared application state for axum handlers.

use std::sync::Arc;

use bizdesk_app::ports::AutomationStore;
use bizdesk_app::services::schedule_service::ScheduleService;

/// Application state shared across all axum handlers.
///
/// Generic over the store type to avoid dynamic dispatch. `Clone` is
/// implemented manually so the store itself does not need to be `Clone`.
pub struct AppState<S> {
    /// Calendar and projection use-cases.
    pub schedule_service: Arc<ScheduleService<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            schedule_service: Arc::clone(&self.schedule_service),
        }
    }
}

impl<S> AppState<S>
where
    S: AutomationStore + Send + Sync + 'static,
{
    /// Create a new application state from a service instance.
    pub fn new(schedule_service: ScheduleService<S>) -> Self {
        Self::from_arc(Arc::new(schedule_service))
    }

    /// Create a new application state from a pre-wrapped service.
    pub fn from_arc(schedule_service: Arc<ScheduleService<S>>) -> Self {
        Self { schedule_service }
    }
}
