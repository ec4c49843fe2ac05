//! # bizdesk-adapter-storage-sqlite-sqlx
//!
//! `SQLite` adapter for the automation store using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `AutomationStore` port defined in `bizdesk-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between database rows and domain types
//!
//! The tables are owned by the automation store; this adapter only reads them.
//!
//! ## Dependency rule
//! Depends on `bizdesk-app` (for port traits) and `bizdesk-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod automation_store;
pub mod error;
pub mod pool;

pub use automation_store::SqliteAutomationStore;
pub use pool::{Config, Database};
