//! Schedule service: use-cases for projecting a tenant's automations.

use bizdesk_domain::automation::AutomationDefinition;
use bizdesk_domain::calendar::{MonthRef, bucket_by_day, is_today};
use bizdesk_domain::error::{BizDeskError, NotFoundError};
use bizdesk_domain::id::TenantId;
use bizdesk_domain::projection::{
    Occurrence, Projection, ProjectionLimits, ProjectionWarning, Window, project,
};
use bizdesk_domain::tenant::Tenant;
use bizdesk_domain::time::Timestamp;

use crate::ports::AutomationStore;

/// One day cell of a month calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub day: u32,
    pub is_today: bool,
    pub occurrences: Vec<Occurrence>,
}

/// A tenant's automations laid out over one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSchedule {
    pub tenant: Tenant,
    pub month: MonthRef,
    /// One entry per day of the month, in order, including empty days.
    pub days: Vec<DaySchedule>,
    pub warnings: Vec<ProjectionWarning>,
    pub truncated: bool,
}

impl MonthSchedule {
    /// Blank cells to render before day 1 (Sunday-first grid).
    #[must_use]
    pub fn leading_blank_days(&self) -> u32 {
        self.month.leading_blank_days()
    }

    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        self.month.days_in_month()
    }

    #[must_use]
    pub fn total_occurrences(&self) -> usize {
        self.days.iter().map(|d| d.occurrences.len()).sum()
    }
}

/// Application service projecting automations into calendars.
pub struct ScheduleService<S> {
    store: S,
    limits: ProjectionLimits,
}

impl<S: AutomationStore> ScheduleService<S> {
    /// Create a new service backed by the given store, with default limits.
    pub fn new(store: S) -> Self {
        Self::with_limits(store, ProjectionLimits::default())
    }

    /// Create a new service with explicit projection limits.
    pub fn with_limits(store: S, limits: ProjectionLimits) -> Self {
        Self { store, limits }
    }

    #[must_use]
    pub fn limits(&self) -> ProjectionLimits {
        self.limits
    }

    /// Build the month calendar of a tenant.
    ///
    /// When `month` is `None` the month containing `now` in the tenant's zone
    /// is used. `now` also decides which day is flagged as today.
    ///
    /// # Errors
    ///
    /// Returns [`BizDeskError::NotFound`] for an unknown tenant, a validation
    /// error when the current month cannot be derived, or a storage error
    /// from the store.
    #[tracing::instrument(skip(self))]
    pub async fn month_schedule(
        &self,
        tenant_id: &TenantId,
        month: Option<MonthRef>,
        now: Timestamp,
    ) -> Result<MonthSchedule, BizDeskError> {
        let tenant = self.tenant(tenant_id).await?;
        let zone = tenant.zone();
        let month = match month {
            Some(month) => month,
            None => MonthRef::containing(now, zone)?,
        };

        let projection = self.project(&tenant, &month.window(zone)).await?;
        let truncated = projection.is_truncated();
        let buckets = bucket_by_day(projection.occurrences, month, zone);
        let days = buckets
            .into_days()
            .into_iter()
            .map(|(day, occurrences)| DaySchedule {
                day,
                is_today: is_today(month, day, now, zone),
                occurrences,
            })
            .collect();

        Ok(MonthSchedule {
            tenant,
            month,
            days,
            warnings: projection.warnings,
            truncated,
        })
    }

    /// Project a tenant's automations into an arbitrary window, sorted by time.
    ///
    /// # Errors
    ///
    /// Returns [`BizDeskError::Projection`] when the window is inverted,
    /// [`BizDeskError::NotFound`] for an unknown tenant, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn project_window(
        &self,
        tenant_id: &TenantId,
        window: Window,
    ) -> Result<Projection, BizDeskError> {
        window.validate()?;
        let tenant = self.tenant(tenant_id).await?;
        self.project(&tenant, &window).await
    }

    async fn tenant(&self, id: &TenantId) -> Result<Tenant, BizDeskError> {
        self.store.get_tenant(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Tenant",
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn project(&self, tenant: &Tenant, window: &Window) -> Result<Projection, BizDeskError> {
        let definitions: Vec<AutomationDefinition> =
            self.store.list_schedulable(&tenant.id).await?;
        let mut projection = project(&definitions, window, self.limits)?;
        projection.sort_by_time();

        report_warnings(&projection.warnings);
        tracing::debug!(
            definitions = definitions.len(),
            occurrences = projection.occurrences.len(),
            "projected automations"
        );
        Ok(projection)
    }
}

fn report_warnings(warnings: &[ProjectionWarning]) {
    for warning in warnings {
        match warning {
            ProjectionWarning::Skipped {
                automation_id,
                reason,
            } => {
                tracing::warn!(%automation_id, %reason, "skipping malformed automation");
            }
            ProjectionWarning::TooManyOccurrences {
                automation_id,
                limit,
            } => {
                tracing::warn!(%automation_id, limit, "automation occurrences truncated at cap");
            }
        }
    }
}
