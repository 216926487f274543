//! Row structs mapping Diesel results to domain records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{
    BlockScope, BlockedSlot, Booking, BookingId, BookingStatus, Master, MasterId, Post, PostId,
    Tenant, TenantId, TimeRange,
};

use super::schema::{blocked_slots, bookings, masters, posts, tenants};

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = tenants)]
pub struct TenantRow {
    pub id: Uuid,
    pub slug: String,
    pub schema_name: String,
    pub active: bool,
    pub can_book: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: TenantId(row.id),
            slug: row.slug,
            schema_name: row.schema_name,
            active: row.active,
            can_book: row.can_book,
            created_at: row.created_at,
        }
    }
}

impl From<&Tenant> for TenantRow {
    fn from(t: &Tenant) -> Self {
        TenantRow {
            id: t.id.0,
            slug: t.slug.clone(),
            schema_name: t.schema_name.clone(),
            active: t.active,
            can_book: t.can_book,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub active: bool,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow {
    pub title: String,
    pub active: bool,
    pub specialization: Option<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId::new(row.id),
            title: row.title,
            active: row.active,
            specialization: row.specialization,
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct MasterRow {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = masters)]
pub struct NewMasterRow {
    pub name: String,
    pub active: bool,
}

impl From<MasterRow> for Master {
    fn from(row: MasterRow) -> Self {
        Master {
            id: MasterId::new(row.id),
            name: row.name,
            active: row.active,
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct BookingRow {
    pub id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub master_id: Option<i64>,
    pub post_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub master_id: Option<i64>,
    pub post_id: Option<i64>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepositoryError;

    fn try_from(row: BookingRow) -> RepositoryResult<Booking> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        Ok(Booking {
            id: BookingId::new(row.id),
            date: row.date,
            start: row.start_time,
            end: row.end_time,
            status,
            master_id: row.master_id.map(MasterId::new),
            post_id: row.post_id.map(PostId::new),
        })
    }
}

impl From<&Booking> for NewBookingRow {
    fn from(b: &Booking) -> Self {
        NewBookingRow {
            date: b.date,
            start_time: b.start,
            end_time: b.end,
            status: b.status.to_string(),
            master_id: b.master_id.map(|m| m.0),
            post_id: b.post_id.map(|p| p.0),
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct BlockedSlotRow {
    pub id: i64,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
    pub master_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blocked_slots)]
pub struct NewBlockedSlotRow {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
    pub master_id: Option<i64>,
}

impl TryFrom<BlockedSlotRow> for BlockedSlot {
    type Error = RepositoryError;

    fn try_from(row: BlockedSlotRow) -> RepositoryResult<BlockedSlot> {
        let time_range = match (row.time_from, row.time_to) {
            (None, None) => None,
            (Some(from), Some(to)) => Some(TimeRange::new(from, to).ok_or_else(|| {
                RepositoryError::internal(format!(
                    "Blocked slot {} carries an inverted time range",
                    row.id
                ))
            })?),
            _ => {
                return Err(RepositoryError::internal(format!(
                    "Blocked slot {} has only one time bound",
                    row.id
                )))
            }
        };
        let scope = match row.master_id {
            Some(m) => BlockScope::Master(MasterId::new(m)),
            None => BlockScope::Business,
        };
        Ok(BlockedSlot {
            id: row.id,
            date_from: row.date_from,
            date_to: row.date_to,
            time_range,
            scope,
        })
    }
}

impl From<&BlockedSlot> for NewBlockedSlotRow {
    fn from(slot: &BlockedSlot) -> Self {
        NewBlockedSlotRow {
            date_from: slot.date_from,
            date_to: slot.date_to,
            time_from: slot.time_range.map(|r| r.start),
            time_to: slot.time_range.map(|r| r.end),
            master_id: match slot.scope {
                BlockScope::Master(m) => Some(m.0),
                BlockScope::Business => None,
            },
        }
    }
}
