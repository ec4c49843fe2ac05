//! How a definition repeats after its anchor.

use chrono::TimeDelta;

const NANOS_PER_HOUR: f64 = 3_600_000_000_000.0;

/// Interpretation of a definition's repeat interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    /// Fires once, at the anchor.
    OneShot,
    /// Fires at the anchor and then every `step` after it.
    Every(TimeDelta),
}

/// A repeat interval that is present and positive but unusable.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid repeat interval: {hours} hours")]
pub struct InvalidInterval {
    pub hours: f64,
}

impl Recurrence {
    /// Interpret an interval expressed in hours.
    ///
    /// Absent, zero and negative intervals all mean one-shot. Fractional
    /// hours are kept with nanosecond precision.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInterval`] for NaN or infinite values, and for
    /// positive values that round to zero nanoseconds or overflow the
    /// duration range.
    pub fn from_hours(hours: Option<f64>) -> Result<Self, InvalidInterval> {
        let Some(hours) = hours else {
            return Ok(Self::OneShot);
        };
        if !hours.is_finite() {
            return Err(InvalidInterval { hours });
        }
        if hours <= 0.0 {
            return Ok(Self::OneShot);
        }

        let nanos = (hours * NANOS_PER_HOUR).round();
        // i64::MAX rounds up to 2^63 as f64, so `>=` rejects exactly the overflowing values.
        #[allow(clippy::cast_precision_loss)]
        let max_nanos = i64::MAX as f64;
        if nanos < 1.0 || nanos >= max_nanos {
            return Err(InvalidInterval { hours });
        }
        #[allow(clippy::cast_possible_truncation)]
        let step = TimeDelta::nanoseconds(nanos as i64);
        Ok(Self::Every(step))
    }

    /// A recurrence of a whole number of hours.
    #[must_use]
    pub fn every_hours(hours: i64) -> Self {
        if hours <= 0 {
            return Self::OneShot;
        }
        Self::Every(TimeDelta::hours(hours))
    }

    /// Step between occurrences, if repeating.
    #[must_use]
    pub fn step(self) -> Option<TimeDelta> {
        match self {
            Self::OneShot => None,
            Self::Every(step) => Some(step),
        }
    }
}
