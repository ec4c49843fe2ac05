//! JSON REST handler for raw occurrence projection.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use bizdesk_app::ports::AutomationStore;
use bizdesk_domain::error::ValidationError;
use bizdesk_domain::id::TenantId;
use bizdesk_domain::projection::{Occurrence, Projection, ProjectionWarning, Window};
use bizdesk_domain::time::{Timestamp, parse_timestamp};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the occurrences endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct OccurrencesQuery {
    /// Inclusive start of the window (RFC 3339).
    pub from: Option<String>,
    /// Inclusive end of the window (RFC 3339).
    pub to: Option<String>,
}

impl OccurrencesQuery {
    fn window(&self) -> Result<Window, ValidationError> {
        Ok(Window {
            start: required(self.from.as_deref(), "from")?,
            end: required(self.to.as_deref(), "to")?,
        })
    }
}

fn required(value: Option<&str>, name: &'static str) -> Result<Timestamp, ValidationError> {
    let value = value.ok_or(ValidationError::MissingParameter(name))?;
    parse_timestamp(value)
}

#[derive(Debug, Serialize)]
pub struct ProjectionBody {
    pub window: Window,
    pub occurrences: Vec<Occurrence>,
    pub warnings: Vec<ProjectionWarning>,
    pub truncated: bool,
}

impl ProjectionBody {
    fn new(window: Window, projection: Projection) -> Self {
        Self {
            window,
            truncated: projection.is_truncated(),
            occurrences: projection.occurrences,
            warnings: projection.warnings,
        }
    }
}

/// Possible responses from the occurrences endpoint.
pub enum ListResponse {
    Ok(Json<ProjectionBody>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/tenants/:tenant_id/occurrences?from=&to=`
pub async fn list<S>(
    State(state): State<AppState<S>>,
    Path(tenant_id): Path<String>,
    Query(query): Query<OccurrencesQuery>,
) -> Result<ListResponse, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let tenant_id = TenantId::new(tenant_id)?;
    let window = query.window()?;
    let projection = state
        .schedule_service
        .project_window(&tenant_id, window)
        .await?;
    Ok(ListResponse::Ok(Json(ProjectionBody::new(window, projection))))
}
