//! # bizdesk-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationStore`: read tenants and their schedulable automations
//! - Define **driving/inbound** use-cases:
//!   - `ScheduleService`: project a tenant's automations into a month
//!     calendar or an arbitrary window
//! - Report data-quality problems found during projection through `tracing`
//!
//! ## Dependency rule
//! Depends on `bizdesk-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
