//! JSON REST handler for the month calendar.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use bizdesk_app::ports::AutomationStore;
use bizdesk_app::services::schedule_service::{DaySchedule, MonthSchedule};
use bizdesk_domain::calendar::MonthRef;
use bizdesk_domain::error::ValidationError;
use bizdesk_domain::id::TenantId;
use bizdesk_domain::projection::{Occurrence, ProjectionWarning};
use bizdesk_domain::tenant::Tenant;
use bizdesk_domain::time::now;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the calendar endpoint.
///
/// Both fields are omitted together to get the current month in the
/// tenant's zone.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    /// Month of the year, `1..=12`.
    pub month: Option<u32>,
}

impl CalendarQuery {
    fn month_ref(&self) -> Result<Option<MonthRef>, ValidationError> {
        match (self.year, self.month) {
            (None, None) => Ok(None),
            (Some(year), Some(month)) => MonthRef::new(year, month).map(Some),
            (Some(_), None) => Err(ValidationError::MissingParameter("month")),
            (None, Some(_)) => Err(ValidationError::MissingParameter("year")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TenantBody {
    pub id: String,
    pub name: String,
    pub utc_offset_seconds: i32,
}

impl From<Tenant> for TenantBody {
    fn from(tenant: Tenant) -> Self {
        Self {
            utc_offset_seconds: tenant.utc_offset_seconds(),
            id: tenant.id.into(),
            name: tenant.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayBody {
    pub day: u32,
    pub is_today: bool,
    pub occurrences: Vec<Occurrence>,
}

impl From<DaySchedule> for DayBody {
    fn from(day: DaySchedule) -> Self {
        Self {
            day: day.day,
            is_today: day.is_today,
            occurrences: day.occurrences,
        }
    }
}

/// Month calendar as rendered by the dashboard grid.
#[derive(Debug, Serialize)]
pub struct CalendarBody {
    pub tenant: TenantBody,
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub leading_blank_days: u32,
    pub days: Vec<DayBody>,
    pub warnings: Vec<ProjectionWarning>,
    pub truncated: bool,
}

impl From<MonthSchedule> for CalendarBody {
    fn from(schedule: MonthSchedule) -> Self {
        Self {
            year: schedule.month.year(),
            month: schedule.month.month(),
            days_in_month: schedule.days_in_month(),
            leading_blank_days: schedule.leading_blank_days(),
            tenant: schedule.tenant.into(),
            days: schedule.days.into_iter().map(DayBody::from).collect(),
            warnings: schedule.warnings,
            truncated: schedule.truncated,
        }
    }
}

/// Possible responses from the calendar endpoint.
pub enum GetResponse {
    Ok(Json<CalendarBody>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/tenants/:tenant_id/calendar?year=&month=`
pub async fn get<S>(
    State(state): State<AppState<S>>,
    Path(tenant_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<GetResponse, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let tenant_id = TenantId::new(tenant_id)?;
    let month = query.month_ref()?;
    let schedule = state
        .schedule_service
        .month_schedule(&tenant_id, month, now())
        .await?;
    Ok(GetResponse::Ok(Json(schedule.into())))
}
