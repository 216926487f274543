//! End-to-end availability tests against the in-memory repository.
//!
//! These drive the scheduling facade the way the HTTP layer does: register a
//! tenant, provision its partition, seed posts/bookings/blackouts, and assert
//! on the slot lists that come back.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use bookbay::db::repositories::LocalRepository;
use bookbay::db::repository::{
    BlackoutRepository, BookingRepository, CapacityRepository, FullRepository, MasterRepository,
    TenantDirectory,
};
use bookbay::models::{
    BlockScope, BlockedSlot, Booking, BookingId, BookingStatus, BookingWindow, Master, MasterId,
    Post, PostId, Slot, Tenant, TenantId,
};
use bookbay::scheduler::{Scheduler, SchedulingError};
use bookbay::tenancy::TenantSession;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn standard_window() -> BookingWindow {
    BookingWindow::new(t(9, 0), t(18, 0), 30)
}

struct Fixture {
    repo: Arc<LocalRepository>,
    scheduler: Scheduler,
    tenant: Tenant,
    session: TenantSession,
}

/// Register + provision a tenant with the given number of active posts.
async fn fixture(slug: &str, capacity: usize) -> Fixture {
    let repo = Arc::new(LocalRepository::new());
    let tenant = Tenant::new(slug);
    repo.insert_tenant(&tenant).await.unwrap();
    repo.provision(tenant.id).await.unwrap();

    let session = TenantSession::bind(&tenant).unwrap();
    for i in 0..capacity {
        let post = Post {
            id: PostId::new(0),
            title: format!("Bay {}", i + 1),
            active: true,
            specialization: None,
        };
        repo.insert_post(&session, &post).await.unwrap();
    }

    let scheduler = Scheduler::new(repo.clone() as Arc<dyn FullRepository>);
    Fixture {
        repo,
        scheduler,
        tenant,
        session,
    }
}

fn booking(start: NaiveTime, end: NaiveTime, status: BookingStatus) -> Booking {
    Booking {
        id: BookingId::new(0),
        date: date(),
        start,
        end,
        status,
        master_id: None,
        post_id: None,
    }
}

async fn list(fx: &Fixture, duration: u32, master: Option<MasterId>) -> Vec<Slot> {
    fx.scheduler
        .list_available_slots_for(fx.tenant.id, date(), duration, standard_window(), master)
        .await
        .unwrap()
        .slots
}

#[tokio::test]
async fn empty_day_offers_the_whole_grid() {
    let fx = fixture("garage-a", 2).await;

    let slots = list(&fx, 60, None).await;
    assert_eq!(slots.len(), 17);
    assert_eq!(slots[0], Slot { start: t(9, 0), end: t(10, 0) });
    assert_eq!(slots[16], Slot { start: t(17, 0), end: t(18, 0) });
    for pair in slots.windows(2) {
        assert!(pair[0].start < pair[1].start);
    }
}

#[tokio::test]
async fn two_unassigned_bookings_fill_capacity_two() {
    let fx = fixture("garage-b", 2).await;
    for _ in 0..2 {
        fx.repo
            .insert_booking(&fx.session, &booking(t(9, 0), t(10, 0), BookingStatus::New))
            .await
            .unwrap();
    }

    let slots = list(&fx, 60, None).await;
    // Fully occupied 09:00-10:00: the exact slot and any overlapping
    // candidate are gone, the first touching-but-not-overlapping one is not
    assert!(!slots.contains(&Slot { start: t(9, 0), end: t(10, 0) }));
    assert!(!slots.contains(&Slot { start: t(9, 30), end: t(10, 30) }));
    assert!(slots.contains(&Slot { start: t(10, 0), end: t(11, 0) }));
}

#[tokio::test]
async fn one_booking_leaves_a_unit_free() {
    let fx = fixture("garage-c", 2).await;
    fx.repo
        .insert_booking(&fx.session, &booking(t(9, 0), t(10, 0), BookingStatus::Confirmed))
        .await
        .unwrap();

    let slots = list(&fx, 60, None).await;
    assert!(slots.contains(&Slot { start: t(9, 0), end: t(10, 0) }));
}

#[tokio::test]
async fn occupied_equals_capacity_blocks_the_slot() {
    let fx = fixture("garage-d", 2).await;
    let mut pinned = booking(t(9, 0), t(10, 0), BookingStatus::New);
    pinned.post_id = Some(PostId::new(1));
    fx.repo.insert_booking(&fx.session, &pinned).await.unwrap();
    fx.repo
        .insert_booking(&fx.session, &booking(t(9, 0), t(10, 0), BookingStatus::New))
        .await
        .unwrap();

    // One distinct pinned unit + one unassigned = 2 = capacity
    let slots = list(&fx, 60, None).await;
    assert!(!slots.contains(&Slot { start: t(9, 0), end: t(10, 0) }));
}

#[tokio::test]
async fn finished_bookings_do_not_consume_capacity() {
    let fx = fixture("garage-e", 1).await;
    fx.repo
        .insert_booking(&fx.session, &booking(t(9, 0), t(10, 0), BookingStatus::Cancelled))
        .await
        .unwrap();
    fx.repo
        .insert_booking(&fx.session, &booking(t(9, 0), t(10, 0), BookingStatus::Completed))
        .await
        .unwrap();

    let slots = list(&fx, 60, None).await;
    assert!(slots.contains(&Slot { start: t(9, 0), end: t(10, 0) }));
}

#[tokio::test]
async fn zero_capacity_short_circuits_to_empty() {
    let fx = fixture("garage-f", 0).await;
    assert!(list(&fx, 60, None).await.is_empty());
}

#[tokio::test]
async fn whole_day_blackout_empties_the_day() {
    let fx = fixture("garage-g", 1).await;
    let blackout = BlockedSlot {
        id: 0,
        date_from: date(),
        date_to: date(),
        time_range: None,
        scope: BlockScope::Business,
    };
    fx.repo.insert_blackout(&fx.session, &blackout).await.unwrap();

    assert!(list(&fx, 60, None).await.is_empty());
}

#[tokio::test]
async fn provider_scoped_blackout_only_affects_that_provider() {
    let fx = fixture("garage-h", 2).await;
    let master = fx
        .repo
        .insert_master(
            &fx.session,
            &Master {
                id: MasterId::new(0),
                name: "Pat".to_string(),
                active: true,
            },
        )
        .await
        .unwrap();

    let blackout = BlockedSlot {
        id: 0,
        date_from: date(),
        date_to: date(),
        time_range: None,
        scope: BlockScope::Master(master.id),
    };
    fx.repo.insert_blackout(&fx.session, &blackout).await.unwrap();

    assert!(list(&fx, 60, Some(master.id)).await.is_empty());
    // A different provider and an unscoped request still see the day
    assert!(!list(&fx, 60, Some(MasterId::new(999))).await.is_empty());
    assert!(!list(&fx, 60, None).await.is_empty());
}

#[tokio::test]
async fn master_filter_only_counts_that_masters_bookings() {
    let fx = fixture("garage-i", 1).await;
    let mut other = booking(t(9, 0), t(10, 0), BookingStatus::New);
    other.master_id = Some(MasterId::new(5));
    fx.repo.insert_booking(&fx.session, &other).await.unwrap();

    // Unscoped request sees the booking; a request for master 6 does not
    let unscoped = list(&fx, 60, None).await;
    assert!(!unscoped.contains(&Slot { start: t(9, 0), end: t(10, 0) }));
    let scoped = list(&fx, 60, Some(MasterId::new(6))).await;
    assert!(scoped.contains(&Slot { start: t(9, 0), end: t(10, 0) }));
}

#[tokio::test]
async fn duration_longer_than_window_yields_empty() {
    let fx = fixture("garage-j", 2).await;
    assert!(list(&fx, 10 * 60, None).await.is_empty());
}

#[tokio::test]
async fn lapsed_subscription_gets_empty_list_not_error() {
    let fx = fixture("garage-k", 2).await;
    fx.repo
        .set_booking_capability(fx.tenant.id, false)
        .await
        .unwrap();

    let result = fx
        .scheduler
        .list_available_slots_for(fx.tenant.id, date(), 60, standard_window(), None)
        .await
        .unwrap();
    assert!(result.slots.is_empty());
    assert_eq!(result.failed_checks, 0);
}

#[tokio::test]
async fn unknown_tenant_is_a_hard_error() {
    let fx = fixture("garage-l", 2).await;
    let err = fx
        .scheduler
        .list_available_slots_for(TenantId::new(), date(), 60, standard_window(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::MissingTenant));
}
