//! Tenant: the owner of a set of automations.
//!
//! Every tenant has one canonical [`Zone`] used to cut calendar months into
//! windows and to assign occurrences to days.

use crate::error::{BizDeskError, ValidationError};
use crate::id::TenantId;
use crate::time::{Zone, zone_from_offset};

/// A customer account of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    zone: Zone,
}

impl Tenant {
    /// Create a tenant with a zone given as seconds east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`BizDeskError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - the offset is out of range ([`ValidationError::InvalidOffset`])
    pub fn new(
        id: TenantId,
        name: impl Into<String>,
        utc_offset_seconds: i32,
    ) -> Result<Self, BizDeskError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id,
            name,
            zone: zone_from_offset(utc_offset_seconds)?,
        })
    }

    /// The tenant's canonical zone.
    #[must_use]
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Offset of the canonical zone east of UTC, in seconds.
    #[must_use]
    pub fn utc_offset_seconds(&self) -> i32 {
        self.zone.local_minus_utc()
    }
}
