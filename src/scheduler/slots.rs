//! Candidate slot generation.
//!
//! Pure and stateless: the grid is a function of its inputs, restartable,
//! with no storage access. Candidate starts advance by the configured
//! granularity, not by the service duration; a 90-minute service on a
//! 30-minute grid deliberately yields overlapping candidates so shorter
//! services do not waste capacity between grid lines.

use chrono::{Duration, NaiveTime};

use crate::models::{BookingWindow, Slot};

/// Iterator over the candidate slots of one business day.
///
/// Emits `(t, t + duration)` for `t = open, open + step, …` while
/// `t + duration <= close`. When the duration does not fit the window at all
/// the grid is immediately empty; that is a normal outcome, not an error.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    next_start: Option<NaiveTime>,
    close: NaiveTime,
    duration: Duration,
    step: Duration,
}

impl SlotGrid {
    /// Build the grid for one day's window and a requested service duration.
    pub fn new(window: BookingWindow, duration_minutes: u32) -> Self {
        let duration = Duration::minutes(i64::from(duration_minutes));
        let step = Duration::minutes(i64::from(window.granularity_minutes));
        // Degenerate inputs produce an empty grid rather than looping
        let start = if duration_minutes == 0 || window.granularity_minutes == 0 {
            None
        } else {
            Some(window.open)
        };
        Self {
            next_start: start,
            close: window.close,
            duration,
            step,
        }
    }
}

impl Iterator for SlotGrid {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let start = self.next_start?;

        // End of candidate; a wrap past midnight terminates the grid
        let (end, wrapped) = start.overflowing_add_signed(self.duration);
        if wrapped != 0 || end > self.close || end <= start {
            self.next_start = None;
            return None;
        }

        // Advance the cursor by the granularity for the following candidate
        let (next, step_wrapped) = start.overflowing_add_signed(self.step);
        self.next_start = if step_wrapped != 0 || next <= start {
            None
        } else {
            Some(next)
        };

        Some(Slot { start, end })
    }
}

/// Collect the full candidate sequence for a window and duration.
pub fn candidate_slots(window: BookingWindow, duration_minutes: u32) -> Vec<Slot> {
    SlotGrid::new(window, duration_minutes).collect()
}
