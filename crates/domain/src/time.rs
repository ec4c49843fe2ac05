//! Time and timestamp helpers.

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for anchors, occurrences and window bounds.
pub type Timestamp = DateTime<Utc>;

/// Canonical zone of a tenant: a fixed offset from UTC.
///
/// Repeat intervals are fixed durations, so the zone carries no
/// daylight-saving rules either.
pub type Zone = FixedOffset;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse an RFC 3339 / ISO-8601 timestamp with an explicit offset.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimestamp`] when `value` cannot be parsed.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(|_| ValidationError::InvalidTimestamp(value.to_owned()))
}

/// Build a [`Zone`] from an offset east of UTC, in seconds.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidOffset`] when the offset is not
/// strictly within ±24 hours.
pub fn zone_from_offset(seconds: i32) -> Result<Zone, ValidationError> {
    FixedOffset::east_opt(seconds).ok_or(ValidationError::InvalidOffset(seconds))
}
