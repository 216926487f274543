//! Unit tests for the pure scheduling pieces: the slot grid and the
//! capacity/blackout arithmetic. End-to-end facade behavior is covered by
//! the integration suites under `tests/`.

use chrono::NaiveTime;

use crate::models::{
    BlockScope, BlockedSlot, Booking, BookingId, BookingStatus, BookingWindow, MasterId, PostId,
    Slot, TimeRange,
};
use crate::scheduler::availability::{blackout_blocks, occupied_capacity};
use crate::scheduler::slots::{candidate_slots, SlotGrid};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn window(open_h: u32, close_h: u32, granularity: u32) -> BookingWindow {
    BookingWindow::new(t(open_h, 0), t(close_h, 0), granularity)
}

fn booking(start: NaiveTime, end: NaiveTime, post: Option<i64>) -> Booking {
    Booking {
        id: BookingId::new(0),
        date: chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        start,
        end,
        status: BookingStatus::New,
        master_id: None,
        post_id: post.map(PostId::new),
    }
}

#[test]
fn test_grid_standard_day() {
    // 09:00-18:00, 30-minute grid, 60-minute service: starts every half
    // hour from 09:00 through 17:00
    let slots = candidate_slots(window(9, 18, 30), 60);
    assert_eq!(slots.len(), 17);
    assert_eq!(slots[0], Slot { start: t(9, 0), end: t(10, 0) });
    assert_eq!(slots[16], Slot { start: t(17, 0), end: t(18, 0) });
}

#[test]
fn test_grid_ordered_and_duration_preserving() {
    let slots = candidate_slots(window(9, 18, 30), 90);
    for pair in slots.windows(2) {
        assert!(pair[0].start < pair[1].start);
    }
    for slot in &slots {
        assert_eq!((slot.end - slot.start).num_minutes(), 90);
    }
}

#[test]
fn test_grid_advances_by_granularity_not_duration() {
    // 90-minute service on a 30-minute grid: starts 30 minutes apart
    let slots = candidate_slots(window(9, 12, 30), 90);
    let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30)]);
}

#[test]
fn test_grid_last_candidate_touches_close() {
    let slots = candidate_slots(window(9, 12, 60), 60);
    assert_eq!(slots.last().unwrap().end, t(12, 0));
}

#[test]
fn test_grid_duration_exceeding_window_is_empty() {
    assert!(candidate_slots(window(9, 10, 30), 120).is_empty());
}

#[test]
fn test_grid_duration_exactly_window() {
    let slots = candidate_slots(window(9, 10, 30), 60);
    assert_eq!(slots, vec![Slot { start: t(9, 0), end: t(10, 0) }]);
}

#[test]
fn test_grid_degenerate_inputs() {
    assert!(candidate_slots(window(9, 18, 0), 60).is_empty());
    assert!(candidate_slots(window(9, 18, 30), 0).is_empty());
}

#[test]
fn test_grid_is_restartable() {
    let grid = SlotGrid::new(window(9, 18, 30), 60);
    let first: Vec<Slot> = grid.clone().collect();
    let second: Vec<Slot> = grid.collect();
    assert_eq!(first, second);
}

#[test]
fn test_occupied_counts_distinct_posts_once() {
    let bookings = vec![
        booking(t(9, 0), t(10, 0), Some(1)),
        booking(t(9, 0), t(10, 0), Some(1)),
        booking(t(9, 0), t(10, 0), Some(2)),
    ];
    assert_eq!(occupied_capacity(&bookings), 2);
}

#[test]
fn test_occupied_unassigned_each_take_a_unit() {
    let bookings = vec![
        booking(t(9, 0), t(10, 0), None),
        booking(t(9, 0), t(10, 0), None),
    ];
    assert_eq!(occupied_capacity(&bookings), 2);
}

#[test]
fn test_occupied_mixed() {
    let bookings = vec![
        booking(t(9, 0), t(10, 0), Some(1)),
        booking(t(9, 30), t(10, 30), Some(1)),
        booking(t(9, 0), t(10, 0), None),
    ];
    assert_eq!(occupied_capacity(&bookings), 2);
    assert_eq!(occupied_capacity(&[]), 0);
}

fn blackout(time_range: Option<TimeRange>, scope: BlockScope) -> BlockedSlot {
    let date = chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    BlockedSlot {
        id: 1,
        date_from: date,
        date_to: date,
        time_range,
        scope,
    }
}

#[test]
fn test_full_day_business_blackout_blocks_everything() {
    let b = blackout(None, BlockScope::Business);
    let candidate = TimeRange::new(t(9, 0), t(10, 0)).unwrap();
    assert!(blackout_blocks(&b, &candidate, None));
    assert!(blackout_blocks(&b, &candidate, Some(MasterId::new(7))));
}

#[test]
fn test_timed_blackout_blocks_only_when_covering() {
    let b = blackout(
        TimeRange::new(t(12, 0), t(14, 0)),
        BlockScope::Business,
    );
    let covered = TimeRange::new(t(12, 30), t(13, 30)).unwrap();
    let partial = TimeRange::new(t(13, 30), t(14, 30)).unwrap();
    let outside = TimeRange::new(t(9, 0), t(10, 0)).unwrap();
    assert!(blackout_blocks(&b, &covered, None));
    assert!(!blackout_blocks(&b, &partial, None));
    assert!(!blackout_blocks(&b, &outside, None));
}

#[test]
fn test_master_scoped_blackout_only_hits_that_master() {
    let b = blackout(None, BlockScope::Master(MasterId::new(3)));
    let candidate = TimeRange::new(t(9, 0), t(10, 0)).unwrap();
    assert!(blackout_blocks(&b, &candidate, Some(MasterId::new(3))));
    assert!(!blackout_blocks(&b, &candidate, Some(MasterId::new(4))));
    assert!(!blackout_blocks(&b, &candidate, None));
}

#[test]
fn test_blackout_date_span() {
    let b = BlockedSlot {
        id: 1,
        date_from: chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        date_to: chrono::NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
        time_range: None,
        scope: BlockScope::Business,
    };
    assert!(b.applies_on(chrono::NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()));
    assert!(!b.applies_on(chrono::NaiveDate::from_ymd_opt(2025, 6, 5).unwrap()));
}
