//! Availability decisions for candidate slots.
//!
//! A slot is bookable when occupied capacity stays below the tenant's active
//! post count and no blackout window forbids it. All interval comparisons are
//! half-open: a booking ending exactly when the candidate starts does not
//! collide with it.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{BlockScope, BlockedSlot, Booking, MasterId, TimeRange};
use crate::tenancy::session::TenantSession;

/// Count occupied capacity units among intersecting bookings.
///
/// Each booking pinned to a post occupies that post; several bookings on the
/// same post count once. Each unassigned booking occupies one whole unit on
/// its own: which bay it will land on is not yet known, so pooling them would
/// risk overbooking. This pessimism is deliberate policy, carried over from
/// the booking product, even though it can under-utilize capacity when many
/// bookings lack a pinned post.
pub fn occupied_capacity(bookings: &[Booking]) -> u32 {
    let mut assigned_posts = HashSet::new();
    let mut unassigned = 0u32;
    for booking in bookings {
        match booking.post_id {
            Some(post) => {
                assigned_posts.insert(post);
            }
            None => unassigned += 1,
        }
    }
    assigned_posts.len() as u32 + unassigned
}

/// Whether a blackout window forbids the candidate interval.
///
/// Business-wide windows apply to every request; master-scoped windows apply
/// only when that exact master was requested. A timed window blocks only when
/// it covers the whole candidate; a full-day window always blocks.
pub fn blackout_blocks(
    blackout: &BlockedSlot,
    candidate: &TimeRange,
    requested_master: Option<MasterId>,
) -> bool {
    let in_scope = match blackout.scope {
        BlockScope::Business => true,
        BlockScope::Master(m) => requested_master == Some(m),
    };
    in_scope && blackout.blocks(candidate)
}

/// Decide whether the candidate interval is bookable for the bound tenant.
///
/// Storage errors propagate to the caller; the facade is responsible for
/// treating them as "slot unavailable" (fail closed) while keeping the error
/// for diagnostics.
pub async fn is_available(
    repository: &dyn FullRepository,
    session: &TenantSession,
    date: NaiveDate,
    candidate: TimeRange,
    master: Option<MasterId>,
) -> RepositoryResult<bool> {
    let capacity = repository.active_capacity(session).await?;
    if capacity == 0 {
        return Ok(false);
    }

    let bookings = repository
        .bookings_overlapping(session, date, candidate, master)
        .await?;
    if occupied_capacity(&bookings) >= capacity {
        return Ok(false);
    }

    let blackouts = repository.blackouts_for_date(session, date).await?;
    if blackouts
        .iter()
        .any(|b| blackout_blocks(b, &candidate, master))
    {
        return Ok(false);
    }

    Ok(true)
}
