//! # bizdesk-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **JSON calendar API** consumed by the dashboard
//!   (`/api/tenants/{id}/calendar`, `/api/tenants/{id}/occurrences`)
//! - Map query strings into application service calls (driving adapter)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `bizdesk-app` (for port traits and services) and `bizdesk-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
