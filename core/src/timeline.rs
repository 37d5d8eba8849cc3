//! Measurement-timeline reconciliation.
//!
//! Charts want a dense, day-aligned series, but measurements are sparse and
//! irregular. `Timeline::reconcile` aligns a sample set onto every calendar
//! day of a target interval, keeping explicit gaps where no measurement
//! exists, and derives the tick set and value-axis bounds for rendering.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Fixed padding added below the minimum and above the maximum observed
/// value when computing axis bounds.
pub const BOUNDS_PADDING: f64 = 2.0;

/// A dated observation, e.g. one weight or waist measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub date: NaiveDate,
    pub value: f64,
}

/// One day on the reconciled timeline. `value` is `None` on days without a
/// measurement; consumers skip those rather than interpolating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Value-axis range, `[min - padding, max + padding]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    fn around(min: f64, max: f64) -> Self {
        Self {
            min: min - BOUNDS_PADDING,
            max: max + BOUNDS_PADDING,
        }
    }

    fn extend(self, value: f64) -> Self {
        Self {
            min: self.min.min(value - BOUNDS_PADDING),
            max: self.max.max(value + BOUNDS_PADDING),
        }
    }
}

/// A sparse sample set reconciled onto a dense `[start, end]` day interval.
///
/// The day sequence itself stays lazy: `points()` hands out a fresh,
/// restartable iterator each call, while ticks and bounds are precomputed.
#[derive(Debug, Clone)]
pub struct Timeline {
    range: Option<(NaiveDate, NaiveDate)>,
    by_date: HashMap<NaiveDate, f64>,
    ticks: Vec<NaiveDate>,
    bounds: Option<Bounds>,
}

impl Timeline {
    /// Align `samples` onto every day of `[start, end]` inclusive.
    ///
    /// Samples outside the interval are dropped. Duplicate dates keep the
    /// first occurrence. An inverted interval degrades to an empty timeline
    /// rather than an error.
    #[must_use]
    pub fn reconcile(samples: &[Sample], start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            return Self::empty();
        }

        let mut by_date: HashMap<NaiveDate, f64> = HashMap::new();
        for sample in samples {
            if sample.date < start || sample.date > end {
                continue;
            }
            by_date.entry(sample.date).or_insert(sample.value);
        }

        let mut ticks: Vec<NaiveDate> = by_date.keys().copied().collect();
        ticks.sort_unstable();

        let bounds = by_date
            .values()
            .fold(None::<(f64, f64)>, |acc, &v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
            .map(|(min, max)| Bounds::around(min, max));

        Self {
            range: Some((start, end)),
            by_date,
            ticks,
            bounds,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            range: None,
            by_date: HashMap::new(),
            ticks: Vec::new(),
            bounds: None,
        }
    }

    /// Fresh iterator over the dense day sequence. Calling again restarts
    /// from the first day.
    #[must_use]
    pub fn points(&self) -> Points<'_> {
        Points {
            next: self.range.map(|(start, _)| start),
            end: self.range.map_or(NaiveDate::MIN, |(_, end)| end),
            by_date: &self.by_date,
        }
    }

    /// Inclusive day count of the interval.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn len(&self) -> usize {
        match self.range {
            Some((start, end)) => (end - start).num_days() as usize + 1,
            None => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    /// Dates that carry an actual measurement, sorted ascending.
    #[must_use]
    pub fn ticks(&self) -> &[NaiveDate] {
        &self.ticks
    }

    /// `None` when no value was observed in the interval; the caller must
    /// suppress rendering in that case.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

/// Lazy day-by-day walk over a [`Timeline`]. Finite and restartable; values
/// are looked up on demand.
#[derive(Debug, Clone)]
pub struct Points<'a> {
    next: Option<NaiveDate>,
    end: NaiveDate,
    by_date: &'a HashMap<NaiveDate, f64>,
}

impl Iterator for Points<'_> {
    type Item = TimelinePoint;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.next?;
        self.next = if date < self.end {
            Some(date + Duration::days(1))
        } else {
            None
        };
        Some(TimelinePoint {
            date,
            value: self.by_date.get(&date).copied(),
        })
    }

    #[allow(clippy::cast_sign_loss)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map_or(0, |date| (self.end - date).num_days() as usize + 1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Points<'_> {}

/// The full contract consumed by chart rendering: materialized series, tick
/// set, axis bounds, and an optional goal trajectory.
#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub series: Vec<TimelinePoint>,
    pub ticks: Vec<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_line: Option<[Sample; 2]>,
}

impl ChartView {
    #[must_use]
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            series: timeline.points().collect(),
            ticks: timeline.ticks().to_vec(),
            bounds: timeline.bounds(),
            goal_line: None,
        }
    }

    /// Attach a start-to-goal trajectory and widen the bounds so the line
    /// fits on the same axis.
    #[must_use]
    pub fn with_goal_line(timeline: &Timeline, goal_line: [Sample; 2]) -> Self {
        let mut view = Self::new(timeline);
        let mut bounds = view.bounds.unwrap_or_else(|| {
            Bounds::around(goal_line[0].value, goal_line[0].value)
        });
        for sample in &goal_line {
            bounds = bounds.extend(sample.value);
        }
        view.bounds = Some(bounds);
        view.goal_line = Some(goal_line);
        view
    }
}
