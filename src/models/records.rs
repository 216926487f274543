//! Domain records shared by the repository layer and the scheduler.
//!
//! All types derive Serialize/Deserialize for JSON serialization. Identifier
//! newtypes keep tenant-partition keys (`i64` surrogate ids) from being mixed
//! up with one another or with the registry-level tenant UUID.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::TimeRange;

/// Tenant identifier (registry-level UUID).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenantId(pub Uuid);

/// Booking identifier (tenant-partition primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(pub i64);

/// Capacity unit ("post" / service bay) identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub i64);

/// Provider ("master" / staff member) identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MasterId(pub i64);

impl TenantId {
    pub fn new() -> Self {
        TenantId(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl BookingId {
    pub fn new(value: i64) -> Self {
        BookingId(value)
    }
}

impl PostId {
    pub fn new(value: i64) -> Self {
        PostId(value)
    }
}

impl MasterId {
    pub fn new(value: i64) -> Self {
        MasterId(value)
    }
}

/// One service business account, as recorded in the shared registry.
///
/// Owned by the billing subsystem; the scheduler only reads it. `can_book`
/// mirrors subscription state: when false, no slots are offered regardless of
/// actual capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    /// Human-facing short name, unique across the registry.
    pub slug: String,
    /// Name of the tenant's isolated storage partition.
    pub schema_name: String,
    /// Blocked/suspended tenants are inactive.
    pub active: bool,
    /// Billing capability: may this tenant accept bookings right now.
    pub can_book: bool,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a registry record for a new tenant with a derived partition name.
    pub fn new(slug: impl Into<String>) -> Self {
        let id = TenantId::new();
        Self {
            schema_name: crate::tenancy::session::schema_name_for(id),
            id,
            slug: slug.into(),
            active: true,
            can_book: true,
            created_at: Utc::now(),
        }
    }
}

/// Interchangeable service bay. The count of active posts is the tenant's
/// total concurrent-service capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub active: bool,
    /// Optional specialization tag (e.g. "detailing", "tyres").
    pub specialization: Option<String>,
}

/// Staff member a booking may be pinned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Master {
    pub id: MasterId,
    pub name: String,
    pub active: bool,
}

/// Booking lifecycle status. Only `New` and `Confirmed` consume capacity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    New,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this status occupies a capacity unit.
    pub fn consumes_capacity(&self) -> bool {
        matches!(self, BookingStatus::New | BookingStatus::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::New => "new",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(BookingStatus::New),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

/// Tenant-scoped appointment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    /// End = start + service duration; stored denormalized for range queries.
    pub end: NaiveTime,
    pub status: BookingStatus,
    /// Provider the booking is pinned to, when the client asked for one.
    pub master_id: Option<MasterId>,
    /// Capacity unit the booking was assigned to. `None` until a bay is
    /// picked; an unassigned booking still consumes one unit of capacity.
    pub post_id: Option<PostId>,
}

impl Booking {
    /// Time-of-day interval the booking occupies.
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }
}

/// Scope of a blackout window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "master_id")]
pub enum BlockScope {
    /// Applies to the whole business.
    Business,
    /// Applies only to one provider.
    Master(MasterId),
}

/// Administrator-declared period during which bookings may not be placed.
///
/// A window spans one or more dates; an absent time range means the whole
/// day is blocked on every date in range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedSlot {
    pub id: i64,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Time-of-day restriction; `None` blocks the whole day.
    pub time_range: Option<TimeRange>,
    #[serde(flatten)]
    pub scope: BlockScope,
}

impl BlockedSlot {
    /// Whether this window is in force on the given date.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.date_from <= date && date <= self.date_to
    }

    /// Whether this window forbids the candidate interval outright.
    ///
    /// A full-day window always blocks; a timed window blocks only when it
    /// covers the candidate entirely.
    pub fn blocks(&self, candidate: &TimeRange) -> bool {
        match &self.time_range {
            None => true,
            Some(window) => window.covers(candidate),
        }
    }
}

/// Per-tenant business-hours settings handed in by tenant administration.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct BookingWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
    /// Step between successive candidate slot starts, in minutes.
    /// Independent of service duration.
    pub granularity_minutes: u32,
}

impl BookingWindow {
    pub fn new(open: NaiveTime, close: NaiveTime, granularity_minutes: u32) -> Self {
        Self {
            open,
            close,
            granularity_minutes,
        }
    }
}

/// Candidate booking interval of exactly the requested service duration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Slot {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }
}

impl From<Slot> for TimeRange {
    fn from(s: Slot) -> Self {
        s.range()
    }
}
