//! ISO-week arithmetic for the weekly goal cycle.

use chrono::{Datelike, Duration, NaiveDate};

/// Monday of the ISO week containing `date`.
///
/// Sunday sits at the end of the ISO week, so it maps 6 days back; any other
/// weekday maps `weekday - 1` days back (Monday = 1 .. Saturday = 6).
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let weekday = i64::from(date.weekday().num_days_from_sunday());
    let offset = if weekday == 0 { 6 } else { weekday - 1 };
    date - Duration::days(offset)
}

/// True when a goal's stored week no longer matches the week of `today` and
/// its counter must be reset.
#[must_use]
pub fn needs_reset(stored_week_start: NaiveDate, today: NaiveDate) -> bool {
    stored_week_start != week_start(today)
}

/// Apply `delta` to a completion counter, clamped into `[0, frequency]`.
/// Pushing past either bound is a no-op on that bound, not an error.
#[must_use]
pub fn adjust_completed(completed: i64, delta: i64, frequency: i64) -> i64 {
    (completed + delta).clamp(0, frequency)
}
