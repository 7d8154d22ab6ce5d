//! Weekly time windows and scheduling slots.
//!
//! A slot is a recurring weekly window: a weekday plus a time-of-day
//! interval. Intervals are half-open, `[start, end)`, so back-to-back
//! windows (09:00–10:00, 10:00–11:00) do not overlap.

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A weekday plus a half-open time-of-day interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeeklyWindow {
    /// Day of the week.
    pub weekday: Weekday,
    /// Interval start (inclusive).
    pub start: NaiveTime,
    /// Interval end (exclusive).
    pub end: NaiveTime,
}

impl WeeklyWindow {
    /// Creates a new window.
    pub fn new(weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            weekday,
            start,
            end,
        }
    }

    /// Whether the interval is non-empty (`start < end`).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Whether two windows share a weekday and intersect.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.weekday == other.weekday && self.start < other.end && self.end > other.start
    }

    /// Whether `other` lies fully inside this window on the same weekday.
    pub fn contains(&self, other: &Self) -> bool {
        self.weekday == other.weekday && self.start <= other.start && other.end <= self.end
    }
}

/// A recurring weekly time slot within a scheduling period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Unique slot identifier.
    pub id: Uuid,
    /// Scheduling period this slot belongs to.
    pub scheduling_period_id: Uuid,
    /// Day of the week.
    pub weekday: Weekday,
    /// Start time of day (inclusive).
    pub start_time: NaiveTime,
    /// End time of day (exclusive).
    pub end_time: NaiveTime,
}

impl Slot {
    /// Creates a slot with a fresh identifier.
    pub fn new(
        scheduling_period_id: Uuid,
        weekday: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            scheduling_period_id,
            weekday,
            start_time,
            end_time,
        }
    }

    /// Overrides the identifier.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// The slot's weekly window.
    #[inline]
    pub fn window(&self) -> WeeklyWindow {
        WeeklyWindow::new(self.weekday, self.start_time, self.end_time)
    }

    /// Whether this slot's interval lies within `[start, end]` (weekday ignored).
    pub fn is_within(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time >= start && self.end_time <= end
    }

    /// Whether two slots share a weekday and intersect.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.window().overlaps(&other.window())
    }

    /// Start hour of day (0–23).
    #[inline]
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }
}
