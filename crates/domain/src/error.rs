//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`BizDeskError`] via `#[from]`.

use crate::time::Timestamp;

/// Top-level error shared by every layer of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum BizDeskError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("projection error")]
    Projection(#[from] ProjectionError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated by some input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("identifier must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("invalid utc offset: {0} seconds")]
    InvalidOffset(i32),

    #[error("unknown automation status: {0}")]
    UnknownStatus(String),

    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Structural problems with a projection request.
///
/// These indicate a caller bug rather than bad data, so they abort the
/// whole projection instead of being reported as per-definition warnings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow { start: Timestamp, end: Timestamp },
}
