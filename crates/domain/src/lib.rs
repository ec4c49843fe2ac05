//! # bizdesk-domain
//!
//! Pure domain model for the bizdesk automation calendar.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Tenants** (the owner of a set of automations and of a canonical zone)
//! - Define **Automation definitions** (anchor timestamp + optional repeat interval)
//! - **Project** definitions into concrete occurrences inside a time window
//! - **Bucket** occurrences by calendar day for a given month
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod calendar;
pub mod projection;
pub mod tenant;
