//! `SQLite` implementation of [`AutomationStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use bizdesk_app::ports::AutomationStore;
use bizdesk_domain::automation::{AutomationDefinition, AutomationStatus};
use bizdesk_domain::error::BizDeskError;
use bizdesk_domain::id::{AutomationId, TenantId};
use bizdesk_domain::tenant::Tenant;
use bizdesk_domain::time::{Timestamp, parse_timestamp};

use crate::error::StorageError;

struct TenantRow(Tenant);

impl<'r> FromRow<'r, SqliteRow> for TenantRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let utc_offset_seconds: i32 = row.try_get("utc_offset_seconds")?;

        let id = TenantId::new(id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let tenant = Tenant::new(id, name, utc_offset_seconds)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        Ok(Self(tenant))
    }
}

/// A row of `automations`, `None` when the row cannot form a definition.
///
/// Bad data in one row never fails the whole query. Rows without a usable
/// id or name are dropped with a WARN; a bad anchor or interval is kept so
/// projection reports the definition as skipped.
struct AutomationRow(Option<AutomationDefinition>);

impl<'r> FromRow<'r, SqliteRow> for AutomationRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let status: String = row.try_get("status")?;
        let next_execution_time: Option<String> = row.try_get("next_execution_time")?;
        let repeat_interval = repeat_interval(row, &id)?;

        let next_execution_time =
            next_execution_time.and_then(|value| match parse_timestamp(&value) {
                Ok(ts) => Some(ts),
                Err(err) => {
                    tracing::warn!(automation_id = %id, error = %err, "unreadable next execution time");
                    None
                }
            });

        match definition(&id, name, &status, next_execution_time, repeat_interval) {
            Ok(definition) => Ok(Self(Some(definition))),
            Err(err) => {
                tracing::warn!(automation_id = %id, error = %err, "dropping malformed automation row");
                Ok(Self(None))
            }
        }
    }
}

/// Read `repeat_interval`, turning non-numeric values into NaN.
fn repeat_interval(row: &SqliteRow, id: &str) -> Result<Option<f64>, sqlx::Error> {
    match row.try_get::<Option<f64>, _>("repeat_interval") {
        Ok(hours) => Ok(hours),
        Err(sqlx::Error::ColumnDecode { source, .. }) => {
            tracing::warn!(automation_id = %id, error = %source, "non-numeric repeat interval");
            Ok(Some(f64::NAN))
        }
        Err(err) => Err(err),
    }
}

fn definition(
    id: &str,
    name: String,
    status: &str,
    next_execution_time: Option<Timestamp>,
    repeat_interval: Option<f64>,
) -> Result<AutomationDefinition, BizDeskError> {
    let status: AutomationStatus = status.parse()?;
    let mut builder = AutomationDefinition::builder()
        .id(AutomationId::new(id)?)
        .name(name)
        .status(status);
    if let Some(ts) = next_execution_time {
        builder = builder.next_execution_time(ts);
    }
    if let Some(hours) = repeat_interval {
        builder = builder.repeat_interval(hours);
    }
    builder.build()
}

/// `SQLite`-backed automation store.
pub struct SqliteAutomationStore {
    pool: SqlitePool,
}

impl SqliteAutomationStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AutomationStore for SqliteAutomationStore {
    async fn get_tenant(&self, id: &TenantId) -> Result<Option<Tenant>, BizDeskError> {
        let row: Option<TenantRow> = sqlx::query_as("SELECT * FROM tenants WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|r| r.0))
    }

    async fn list_schedulable(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<AutomationDefinition>, BizDeskError> {
        let rows: Vec<AutomationRow> = sqlx::query_as(
            "SELECT * FROM automations WHERE tenant_id = ? AND status = ? ORDER BY name, id",
        )
        .bind(tenant_id.as_str())
        .bind(AutomationStatus::Schedulable.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().filter_map(|r| r.0).collect())
    }
}
