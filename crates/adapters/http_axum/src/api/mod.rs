//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod calendar;
#[allow(clippy::missing_errors_doc)]
pub mod occurrences;

use axum::Router;
use axum::routing::get;

use bizdesk_app::ports::AutomationStore;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: AutomationStore + Send + Sync + 'static,
{
    Router::new()
        .route("/tenants/{tenant_id}/calendar", get(calendar::get::<S>))
        .route(
            "/tenants/{tenant_id}/occurrences",
            get(occurrences::list::<S>),
        )
}
