use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Half-open time-of-day interval `[start, end)`.
///
/// All overlap arithmetic in the scheduler goes through this type so the
/// half-open semantics live in exactly one place: a booking ending at 10:00
/// does not collide with one starting at 10:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    /// Create a new range. Returns `None` when `end <= start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        if end > start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Length of the range in whole minutes.
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// True when the two half-open intervals intersect.
    ///
    /// Touching endpoints do not count as overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely within this range.
    pub fn covers(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the instant falls inside the range.
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod time_tests;
