//! Occurrence projection: expand automation definitions into the concrete
//! firings that fall inside a time window.
//!
//! Repeating definitions are always walked forward from their anchor, so
//! every occurrence is exactly `anchor + k * step` for some `k >= 0`. When the
//! anchor lies before the window the walk skips whole steps at once, which
//! lands on the same instant a step-by-step walk would reach.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::automation::{AutomationDefinition, Recurrence};
use crate::error::ProjectionError;
use crate::id::AutomationId;
use crate::time::Timestamp;

/// Default cap on occurrences emitted for a single definition.
pub const DEFAULT_MAX_OCCURRENCES: usize = 100_000;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Inclusive range of instants to project into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Window {
    /// Create a window, checking that it is not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidWindow`] when `start > end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ProjectionError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidWindow`] when `start > end`.
    pub fn validate(&self) -> Result<(), ProjectionError> {
        if self.start > self.end {
            return Err(ProjectionError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// One concrete firing of an automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub automation_id: AutomationId,
    pub timestamp: Timestamp,
    /// Snapshot of the definition name at projection time.
    pub title: String,
}

/// Safety bounds applied during projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionLimits {
    pub max_occurrences_per_definition: usize,
}

impl Default for ProjectionLimits {
    fn default() -> Self {
        Self {
            max_occurrences_per_definition: DEFAULT_MAX_OCCURRENCES,
        }
    }
}

/// Why a definition produced no occurrences at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkipReason {
    /// The store had no usable next execution time.
    MissingAnchor,
    /// The repeat interval is present but cannot be used.
    InvalidInterval { hours: f64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAnchor => f.write_str("missing next execution time"),
            Self::InvalidInterval { hours } => write!(f, "invalid repeat interval ({hours} hours)"),
        }
    }
}

/// A per-definition condition that did not abort the projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionWarning {
    /// The definition was malformed and left out.
    Skipped {
        automation_id: AutomationId,
        reason: SkipReason,
    },
    /// The definition hit the occurrence cap; its occurrences were truncated.
    TooManyOccurrences {
        automation_id: AutomationId,
        limit: usize,
    },
}

/// Result of a projection: occurrences plus anything worth reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub occurrences: Vec<Occurrence>,
    pub warnings: Vec<ProjectionWarning>,
}

impl Projection {
    /// Whether at least one definition was cut off at the cap.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ProjectionWarning::TooManyOccurrences { .. }))
    }

    /// Sort occurrences globally by time, breaking ties by automation id.
    pub fn sort_by_time(&mut self) {
        self.occurrences.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.automation_id.cmp(&b.automation_id))
        });
    }
}

/// Expand `definitions` into every occurrence inside `window`.
///
/// Non-schedulable definitions are ignored. Malformed definitions are left
/// out and reported as [`ProjectionWarning::Skipped`]; a definition that
/// would exceed [`ProjectionLimits::max_occurrences_per_definition`] is
/// truncated and reported as [`ProjectionWarning::TooManyOccurrences`].
///
/// Occurrences of one definition are in increasing time order; no order is
/// guaranteed across definitions (see [`Projection::sort_by_time`]).
///
/// # Errors
///
/// Returns [`ProjectionError::InvalidWindow`] when `window.start > window.end`.
pub fn project(
    definitions: &[AutomationDefinition],
    window: &Window,
    limits: ProjectionLimits,
) -> Result<Projection, ProjectionError> {
    window.validate()?;

    let mut projection = Projection::default();
    for definition in definitions.iter().filter(|d| d.is_schedulable()) {
        let Some(anchor) = definition.next_execution_time else {
            projection.warnings.push(ProjectionWarning::Skipped {
                automation_id: definition.id.clone(),
                reason: SkipReason::MissingAnchor,
            });
            continue;
        };
        let recurrence = match definition.recurrence() {
            Ok(recurrence) => recurrence,
            Err(err) => {
                projection.warnings.push(ProjectionWarning::Skipped {
                    automation_id: definition.id.clone(),
                    reason: SkipReason::InvalidInterval { hours: err.hours },
                });
                continue;
            }
        };

        let expansion = expand(
            anchor,
            recurrence,
            window,
            limits.max_occurrences_per_definition,
        );
        projection
            .occurrences
            .extend(expansion.timestamps.into_iter().map(|timestamp| Occurrence {
                automation_id: definition.id.clone(),
                timestamp,
                title: definition.name.clone(),
            }));
        if expansion.truncated {
            projection
                .warnings
                .push(ProjectionWarning::TooManyOccurrences {
                    automation_id: definition.id.clone(),
                    limit: limits.max_occurrences_per_definition,
                });
        }
    }

    Ok(projection)
}

#[derive(Debug, Default)]
struct Expansion {
    timestamps: Vec<Timestamp>,
    truncated: bool,
}

fn expand(anchor: Timestamp, recurrence: Recurrence, window: &Window, limit: usize) -> Expansion {
    let first = match recurrence.step() {
        None => Some(anchor),
        Some(step) => first_at_or_after(anchor, step, window.start),
    };
    let Some(mut cursor) = first else {
        return Expansion::default();
    };
    if cursor < window.start {
        return Expansion::default();
    }

    let mut expansion = Expansion::default();
    while cursor <= window.end {
        if expansion.timestamps.len() == limit {
            expansion.truncated = true;
            break;
        }
        expansion.timestamps.push(cursor);
        let Some(step) = recurrence.step() else {
            break;
        };
        match cursor.checked_add_signed(step) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    expansion
}

/// First `anchor + k * step` (`k >= 0`) that is not before `start`.
///
/// Returns `None` when that instant is not representable.
fn first_at_or_after(anchor: Timestamp, step: TimeDelta, start: Timestamp) -> Option<Timestamp> {
    if anchor >= start {
        return Some(anchor);
    }
    let step_nanos = i128::from(step.num_nanoseconds()?);
    let behind = nanos_between(anchor, start);
    let steps = (behind + step_nanos - 1) / step_nanos;
    let offset = steps.checked_mul(step_nanos)?;

    let secs = i64::try_from(offset / NANOS_PER_SECOND).ok()?;
    let nanos = u32::try_from(offset % NANOS_PER_SECOND).ok()?;
    anchor.checked_add_signed(TimeDelta::new(secs, nanos)?)
}

fn nanos_between(earlier: Timestamp, later: Timestamp) -> i128 {
    let secs = i128::from(later.timestamp()) - i128::from(earlier.timestamp());
    let nanos = i128::from(later.timestamp_subsec_nanos())
        - i128::from(earlier.timestamp_subsec_nanos());
    secs * NANOS_PER_SECOND + nanos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::AutomationStatus;
    use chrono::{Datelike, TimeZone, Timelike, Utc};

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn month_window(y: i32, m: u32, last_day: u32) -> Window {
        Window::new(
            ts(y, m, 1, 0, 0),
            Utc.with_ymd_and_hms(y, m, last_day, 23, 59, 59).unwrap()
                + TimeDelta::milliseconds(999),
        )
        .unwrap()
    }

    fn definition(id: &str, anchor: Timestamp, interval: Option<f64>) -> AutomationDefinition {
        let mut builder = AutomationDefinition::builder()
            .id(AutomationId::new(id).unwrap())
            .name(format!("Automation {id}"))
            .next_execution_time(anchor);
        if let Some(hours) = interval {
            builder = builder.repeat_interval(hours);
        }
        builder.build().unwrap()
    }

    fn run(definitions: &[AutomationDefinition], window: &Window) -> Projection {
        project(definitions, window, ProjectionLimits::default()).unwrap()
    }

    #[test]
    fn should_project_daily_definition_from_anchor_day_to_month_end() {
        let a1 = definition("A1", ts(2024, 1, 5, 9, 0), Some(24.0));
        let projection = run(&[a1], &month_window(2024, 1, 31));

        assert_eq!(projection.occurrences.len(), 27);
        assert!(projection.warnings.is_empty());
        assert_eq!(projection.occurrences[0].timestamp, ts(2024, 1, 5, 9, 0));
        assert_eq!(projection.occurrences[26].timestamp, ts(2024, 1, 31, 9, 0));
        assert!(projection.occurrences.iter().all(|o| o.timestamp.day() >= 5));
    }

    #[test]
    fn should_preserve_phase_in_following_month() {
        let a1 = definition("A1", ts(2024, 1, 5, 9, 0), Some(24.0));
        let projection = run(&[a1], &month_window(2024, 2, 29));

        assert_eq!(projection.occurrences.len(), 29);
        for (i, occurrence) in projection.occurrences.iter().enumerate() {
            assert_eq!(occurrence.timestamp.month(), 2);
            assert_eq!(occurrence.timestamp.day() as usize, i + 1);
            assert_eq!(occurrence.timestamp.hour(), 9);
            assert_eq!(occurrence.timestamp.minute(), 0);
        }
    }

    #[test]
    fn should_emit_one_shot_only_when_anchor_inside_window() {
        let window = month_window(2024, 1, 31);
        let inside = definition("in", ts(2024, 1, 15, 12, 0), None);
        let before = definition("before", ts(2023, 12, 31, 23, 59), None);
        let after = definition("after", ts(2024, 2, 1, 0, 0), None);

        let projection = run(&[inside, before, after], &window);

        assert_eq!(projection.occurrences.len(), 1);
        assert_eq!(projection.occurrences[0].automation_id.as_str(), "in");
    }

    #[test]
    fn should_include_one_shot_on_window_bounds() {
        let window = month_window(2024, 1, 31);
        let at_start = definition("start", window.start, None);
        let at_end = definition("end", window.end, None);

        let projection = run(&[at_start, at_end], &window);

        assert_eq!(projection.occurrences.len(), 2);
    }

    #[test]
    fn should_treat_zero_and_negative_interval_as_one_shot() {
        let window = month_window(2024, 1, 31);
        let zero = definition("zero", ts(2024, 1, 10, 8, 0), Some(0.0));
        let negative = definition("neg", ts(2024, 1, 20, 8, 0), Some(-12.0));

        let projection = run(&[zero, negative], &window);

        assert_eq!(projection.occurrences.len(), 2);
        assert!(projection.warnings.is_empty());
    }

    #[test]
    fn should_exclude_disabled_definitions() {
        let mut disabled = definition("off", ts(2024, 1, 5, 9, 0), Some(1.0));
        disabled.status = AutomationStatus::Disabled;
        disabled.repeat_interval = Some(f64::NAN);

        let projection = run(&[disabled], &month_window(2024, 1, 31));

        assert!(projection.occurrences.is_empty());
        assert!(projection.warnings.is_empty());
    }

    #[test]
    fn should_emit_nothing_when_anchor_after_window() {
        let late = definition("late", ts(2024, 3, 1, 0, 0), Some(1.0));
        let projection = run(&[late], &month_window(2024, 1, 31));
        assert!(projection.occurrences.is_empty());
    }

    #[test]
    fn should_emit_exactly_the_aligned_instants_when_anchor_before_window() {
        let anchor = ts(2023, 11, 30, 22, 30);
        let step = TimeDelta::hours(7);
        let window = month_window(2024, 1, 31);
        let projection = run(&[definition("p", anchor, Some(7.0))], &window);

        let mut expected = Vec::new();
        let mut cursor = anchor;
        while cursor <= window.end {
            if cursor >= window.start {
                expected.push(cursor);
            }
            cursor += step;
        }
        let actual: Vec<Timestamp> = projection.occurrences.iter().map(|o| o.timestamp).collect();

        assert_eq!(actual, expected);
        let step_nanos = i128::from(step.num_nanoseconds().unwrap());
        for t in &actual {
            assert_eq!(nanos_between(anchor, *t) % step_nanos, 0);
        }
    }

    #[test]
    fn should_preserve_phase_for_fractional_interval() {
        let anchor = ts(2024, 1, 1, 0, 10);
        let projection = run(
            &[definition("frac", anchor, Some(1.5))],
            &Window::new(ts(2024, 1, 2, 0, 0), ts(2024, 1, 2, 6, 0)).unwrap(),
        );

        let actual: Vec<Timestamp> = projection.occurrences.iter().map(|o| o.timestamp).collect();
        assert_eq!(
            actual,
            vec![
                ts(2024, 1, 2, 0, 10),
                ts(2024, 1, 2, 1, 40),
                ts(2024, 1, 2, 3, 10),
                ts(2024, 1, 2, 4, 40),
            ]
        );
    }

    #[test]
    fn should_walk_very_old_anchor_without_reanchoring() {
        let anchor = ts(1970, 1, 1, 0, 17);
        let projection = run(
            &[definition("old", anchor, Some(1.0))],
            &month_window(2024, 1, 31),
        );

        assert_eq!(projection.occurrences.len(), 31 * 24);
        assert!(projection.occurrences.iter().all(|o| o.timestamp.minute() == 17));
    }

    #[test]
    fn should_truncate_at_cap_and_report_too_many_occurrences() {
        let limits = ProjectionLimits {
            max_occurrences_per_definition: 1_000,
        };
        let tiny = definition("tiny", ts(2024, 1, 1, 0, 0), Some(0.001));
        let normal = definition("normal", ts(2024, 1, 5, 9, 0), Some(24.0));

        let projection = project(&[tiny, normal], &month_window(2024, 1, 31), limits).unwrap();

        let tiny_count = projection
            .occurrences
            .iter()
            .filter(|o| o.automation_id.as_str() == "tiny")
            .count();
        assert_eq!(tiny_count, 1_000);
        assert_eq!(projection.occurrences.len(), 1_027);
        assert!(projection.is_truncated());
        assert_eq!(
            projection.warnings,
            vec![ProjectionWarning::TooManyOccurrences {
                automation_id: AutomationId::new("tiny").unwrap(),
                limit: 1_000,
            }]
        );
    }

    #[test]
    fn should_not_report_truncation_when_count_equals_cap() {
        let a1 = definition("A1", ts(2024, 1, 5, 9, 0), Some(24.0));
        let window = month_window(2024, 1, 31);

        let exact = project(
            std::slice::from_ref(&a1),
            &window,
            ProjectionLimits {
                max_occurrences_per_definition: 27,
            },
        )
        .unwrap();
        assert_eq!(exact.occurrences.len(), 27);
        assert!(!exact.is_truncated());

        let short = project(
            &[a1],
            &window,
            ProjectionLimits {
                max_occurrences_per_definition: 26,
            },
        )
        .unwrap();
        assert_eq!(short.occurrences.len(), 26);
        assert!(short.is_truncated());
    }

    #[test]
    fn should_skip_malformed_definitions_and_keep_the_rest() {
        let window = month_window(2024, 1, 31);
        let mut no_anchor = definition("no-anchor", ts(2024, 1, 5, 9, 0), None);
        no_anchor.next_execution_time = None;
        let bad_interval = definition("bad-interval", ts(2024, 1, 5, 9, 0), Some(f64::NAN));
        let good = definition("good", ts(2024, 1, 5, 9, 0), None);

        let projection = run(&[no_anchor, bad_interval, good], &window);

        assert_eq!(projection.occurrences.len(), 1);
        assert_eq!(projection.occurrences[0].automation_id.as_str(), "good");
        assert_eq!(projection.warnings.len(), 2);
        assert!(matches!(
            &projection.warnings[0],
            ProjectionWarning::Skipped { automation_id, reason: SkipReason::MissingAnchor }
                if automation_id.as_str() == "no-anchor"
        ));
        assert!(matches!(
            &projection.warnings[1],
            ProjectionWarning::Skipped { reason: SkipReason::InvalidInterval { .. }, .. }
        ));
        assert!(!projection.is_truncated());
    }

    #[test]
    fn should_fail_fast_when_window_is_inverted() {
        let window = Window {
            start: ts(2024, 2, 1, 0, 0),
            end: ts(2024, 1, 1, 0, 0),
        };
        let result = project(&[], &window, ProjectionLimits::default());
        assert!(matches!(result, Err(ProjectionError::InvalidWindow { .. })));
        assert!(Window::new(window.start, window.end).is_err());
    }

    #[test]
    fn should_return_empty_projection_for_no_definitions() {
        let projection = run(&[], &month_window(2024, 1, 31));
        assert_eq!(projection, Projection::default());
    }

    #[test]
    fn should_snapshot_definition_name_as_title() {
        let mut def = definition("A1", ts(2024, 1, 5, 9, 0), None);
        def.name = "Send invoices".to_string();
        let projection = run(std::slice::from_ref(&def), &month_window(2024, 1, 31));

        def.name = "Renamed".to_string();
        assert_eq!(projection.occurrences[0].title, "Send invoices");
    }

    #[test]
    fn should_be_idempotent() {
        let defs = vec![
            definition("a", ts(2024, 1, 3, 7, 0), Some(5.0)),
            definition("b", ts(2023, 6, 1, 0, 0), Some(48.0)),
        ];
        let window = month_window(2024, 1, 31);
        assert_eq!(run(&defs, &window), run(&defs, &window));
    }

    #[test]
    fn should_sort_occurrences_across_definitions() {
        let defs = vec![
            definition("b", ts(2024, 1, 2, 10, 0), Some(24.0)),
            definition("a", ts(2024, 1, 1, 10, 0), Some(24.0)),
        ];
        let window = Window::new(ts(2024, 1, 2, 0, 0), ts(2024, 1, 3, 0, 0)).unwrap();
        let mut projection = run(&defs, &window);
        projection.sort_by_time();

        let order: Vec<&str> = projection
            .occurrences
            .iter()
            .map(|o| o.automation_id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn should_serialize_warnings_with_kind_tag() {
        let warning = ProjectionWarning::Skipped {
            automation_id: AutomationId::new("A1").unwrap(),
            reason: SkipReason::MissingAnchor,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "skipped",
                "automation_id": "A1",
                "reason": { "type": "missing_anchor" }
            })
        );
    }
}
