//! Calendar months: month windows and day bucketing of occurrences.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::error::ValidationError;
use crate::projection::{Occurrence, Window};
use crate::time::{Timestamp, Zone};

/// Years accepted by [`MonthRef::new`]: four-digit ISO-8601 years.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// A calendar month, `month` being 1-based (January is 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthRef {
    first: NaiveDate,
}

impl MonthRef {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMonth`] when `month` is not in
    /// `1..=12` or `year` is outside `1..=9999`.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !YEAR_RANGE.contains(&year) {
            return Err(ValidationError::InvalidMonth { year, month });
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(ValidationError::InvalidMonth { year, month })
    }

    /// The month that contains `ts` when read in `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMonth`] when the local year is out
    /// of range.
    pub fn containing(ts: Timestamp, zone: Zone) -> Result<Self, ValidationError> {
        let local = ts.with_timezone(&zone).date_naive();
        Self::new(local.year(), local.month())
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.first.year()
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.first.month()
    }

    /// Number of days in the month, leap years included.
    #[must_use]
    pub fn days_in_month(self) -> u32 {
        (29..=31)
            .rev()
            .find(|&day| self.first.with_day(day).is_some())
            .unwrap_or(28)
    }

    /// Date of `day` in this month, if it exists.
    #[must_use]
    pub fn date(self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    /// Blank cells before day 1 in a week grid starting on Sunday.
    #[must_use]
    pub fn leading_blank_days(self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// The month as an inclusive window in `zone`: from midnight of day 1
    /// to the last millisecond of the last day.
    #[must_use]
    pub fn window(self, zone: Zone) -> Window {
        let offset = TimeDelta::seconds(i64::from(zone.local_minus_utc()));
        let start = self.first.and_time(chrono::NaiveTime::MIN) - offset;
        let next = start + TimeDelta::days(i64::from(self.days_in_month()));
        Window {
            start: start.and_utc(),
            end: (next - TimeDelta::milliseconds(1)).and_utc(),
        }
    }

    /// The calendar month before this one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMonth`] past the supported year range.
    pub fn previous(self) -> Result<Self, ValidationError> {
        match self.month() {
            1 => Self::new(self.year() - 1, 12),
            month => Self::new(self.year(), month - 1),
        }
    }

    /// The calendar month after this one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMonth`] past the supported year range.
    pub fn next(self) -> Result<Self, ValidationError> {
        match self.month() {
            12 => Self::new(self.year() + 1, 1),
            month => Self::new(self.year(), month + 1),
        }
    }
}

/// Occurrences of one month grouped by day of month.
///
/// Every day `1..=days_in_month` has a bucket, empty or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBuckets {
    month: MonthRef,
    days: BTreeMap<u32, Vec<Occurrence>>,
}

impl MonthBuckets {
    #[must_use]
    pub fn month(&self) -> MonthRef {
        self.month
    }

    /// Occurrences on `day`; empty for days outside the month.
    #[must_use]
    pub fn day(&self, day: u32) -> &[Occurrence] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    /// Days in ascending order with their occurrences.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Occurrence])> {
        self.days.iter().map(|(day, list)| (*day, list.as_slice()))
    }

    /// Total number of bucketed occurrences.
    #[must_use]
    pub fn total(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn into_days(self) -> BTreeMap<u32, Vec<Occurrence>> {
        self.days
    }
}

/// Group `occurrences` by their local day in `zone`.
///
/// Occurrences that fall outside `month` are dropped. Within a day the input
/// order is kept.
pub fn bucket_by_day(
    occurrences: impl IntoIterator<Item = Occurrence>,
    month: MonthRef,
    zone: Zone,
) -> MonthBuckets {
    let mut days: BTreeMap<u32, Vec<Occurrence>> =
        (1..=month.days_in_month()).map(|day| (day, Vec::new())).collect();

    for occurrence in occurrences {
        let local = occurrence.timestamp.with_timezone(&zone).date_naive();
        if local.year() != month.year() || local.month() != month.month() {
            continue;
        }
        if let Some(bucket) = days.get_mut(&local.day()) {
            bucket.push(occurrence);
        }
    }

    MonthBuckets { month, days }
}

/// Whether `day` of `month` is the current date in `zone`.
///
/// `now` is passed in rather than read from the clock, so callers evaluate
/// it on every render.
#[must_use]
pub fn is_today(month: MonthRef, day: u32, now: Timestamp, zone: Zone) -> bool {
    month
        .date(day)
        .is_some_and(|date| now.with_timezone(&zone).date_naive() == date)
}
