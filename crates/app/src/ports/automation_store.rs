//! Automation store port: read access to tenants and their automations.
//!
//! Creating, editing, deleting and toggling automations belongs to the store
//! itself; this port only exposes what projection needs.

use std::future::Future;
use std::sync::Arc;

use bizdesk_domain::automation::AutomationDefinition;
use bizdesk_domain::error::BizDeskError;
use bizdesk_domain::id::TenantId;
use bizdesk_domain::tenant::Tenant;

/// Source of automation definitions for a tenant.
pub trait AutomationStore {
    /// Get a tenant by its identifier.
    fn get_tenant(
        &self,
        id: &TenantId,
    ) -> impl Future<Output = Result<Option<Tenant>, BizDeskError>> + Send;

    /// List the tenant's automations whose status is schedulable.
    fn list_schedulable(
        &self,
        tenant_id: &TenantId,
    ) -> impl Future<Output = Result<Vec<AutomationDefinition>, BizDeskError>> + Send;
}

impl<T: AutomationStore + Send + Sync> AutomationStore for Arc<T> {
    fn get_tenant(
        &self,
        id: &TenantId,
    ) -> impl Future<Output = Result<Option<Tenant>, BizDeskError>> + Send {
        (**self).get_tenant(id)
    }

    fn list_schedulable(
        &self,
        tenant_id: &TenantId,
    ) -> impl Future<Output = Result<Vec<AutomationDefinition>, BizDeskError>> + Send {
        (**self).list_schedulable(tenant_id)
    }
}
