//! In-memory repository implementation.
//!
//! Backs unit and integration tests and the default server mode. Partition
//! isolation is modeled the same way the Postgres backend models schemas: a
//! map keyed by partition name, where a session only ever reaches the entry
//! its schema names. Provision and teardown follow the same idempotency
//! rules as the real backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::db::repository::{
    BlackoutRepository, BookingRepository, CapacityRepository, ErrorContext, FullRepository,
    MasterRepository, RepositoryError, RepositoryResult, TenantDirectory,
};
use crate::models::{
    BlockedSlot, Booking, BookingId, BookingStatus, Master, MasterId, Post, PostId, Tenant,
    TenantId, TimeRange,
};
use crate::tenancy::session::TenantSession;

/// One tenant's working tables.
#[derive(Debug, Default)]
struct Partition {
    posts: Vec<Post>,
    masters: Vec<Master>,
    bookings: Vec<Booking>,
    blackouts: Vec<BlockedSlot>,
    next_id: i64,
}

impl Partition {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory multi-partition repository.
#[derive(Debug, Default)]
pub struct LocalRepository {
    tenants: RwLock<HashMap<TenantId, Tenant>>,
    partitions: RwLock<HashMap<String, Partition>>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a closure against the session's partition.
    fn with_partition<T>(
        &self,
        session: &TenantSession,
        operation: &str,
        f: impl FnOnce(&Partition) -> T,
    ) -> RepositoryResult<T> {
        let partitions = self.partitions.read();
        let partition = partitions.get(session.schema()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Tenant partition not provisioned",
                ErrorContext::new(operation).with_partition(session.schema()),
            )
        })?;
        Ok(f(partition))
    }

    /// Run a mutating closure against the session's partition.
    fn with_partition_mut<T>(
        &self,
        session: &TenantSession,
        operation: &str,
        f: impl FnOnce(&mut Partition) -> T,
    ) -> RepositoryResult<T> {
        let mut partitions = self.partitions.write();
        let partition = partitions.get_mut(session.schema()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Tenant partition not provisioned",
                ErrorContext::new(operation).with_partition(session.schema()),
            )
        })?;
        Ok(f(partition))
    }
}

#[async_trait]
impl TenantDirectory for LocalRepository {
    async fn find_tenant(&self, id: TenantId) -> RepositoryResult<Option<Tenant>> {
        Ok(self.tenants.read().get(&id).cloned())
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> RepositoryResult<Option<Tenant>> {
        Ok(self
            .tenants
            .read()
            .values()
            .find(|t| t.slug == slug)
            .cloned())
    }

    async fn list_tenants(&self) -> RepositoryResult<Vec<Tenant>> {
        let mut tenants: Vec<Tenant> = self.tenants.read().values().cloned().collect();
        tenants.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tenants)
    }

    async fn insert_tenant(&self, tenant: &Tenant) -> RepositoryResult<()> {
        let mut tenants = self.tenants.write();
        if tenants.values().any(|t| t.slug == tenant.slug && t.id != tenant.id) {
            return Err(RepositoryError::validation(format!(
                "Tenant slug already registered: {}",
                tenant.slug
            )));
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(())
    }

    async fn set_booking_capability(&self, id: TenantId, can_book: bool) -> RepositoryResult<()> {
        let mut tenants = self.tenants.write();
        let tenant = tenants.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Tenant not registered",
                ErrorContext::new("set_booking_capability").with_entity_id(id),
            )
        })?;
        tenant.can_book = can_book;
        Ok(())
    }

    async fn provision(&self, id: TenantId) -> RepositoryResult<()> {
        let schema = {
            let tenants = self.tenants.read();
            let tenant = tenants.get(&id).ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Cannot provision unregistered tenant",
                    ErrorContext::new("provision").with_entity_id(id),
                )
            })?;
            tenant.schema_name.clone()
        };

        // Idempotent: an existing partition is left untouched
        self.partitions
            .write()
            .entry(schema)
            .or_insert_with(Partition::default);
        Ok(())
    }

    async fn deprovision(&self, id: TenantId) -> RepositoryResult<()> {
        let schema = {
            let tenants = self.tenants.read();
            match tenants.get(&id) {
                Some(tenant) => tenant.schema_name.clone(),
                // Nothing to tear down for an unknown tenant
                None => return Ok(()),
            }
        };
        self.partitions.write().remove(&schema);
        Ok(())
    }

    async fn partition_exists(&self, id: TenantId) -> RepositoryResult<bool> {
        let tenants = self.tenants.read();
        match tenants.get(&id) {
            Some(tenant) => Ok(self.partitions.read().contains_key(&tenant.schema_name)),
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BookingRepository for LocalRepository {
    async fn bookings_overlapping(
        &self,
        session: &TenantSession,
        date: NaiveDate,
        range: TimeRange,
        master: Option<MasterId>,
    ) -> RepositoryResult<Vec<Booking>> {
        self.with_partition(session, "bookings_overlapping", |p| {
            p.bookings
                .iter()
                .filter(|b| b.date == date)
                .filter(|b| b.status.consumes_capacity())
                .filter(|b| b.range().overlaps(&range))
                .filter(|b| match master {
                    Some(m) => b.master_id == Some(m),
                    None => true,
                })
                .cloned()
                .collect()
        })
    }

    async fn bookings_for_date(
        &self,
        session: &TenantSession,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Booking>> {
        self.with_partition(session, "bookings_for_date", |p| {
            let mut bookings: Vec<Booking> = p
                .bookings
                .iter()
                .filter(|b| b.date == date)
                .cloned()
                .collect();
            bookings.sort_by_key(|b| b.start);
            bookings
        })
    }

    async fn insert_booking(
        &self,
        session: &TenantSession,
        booking: &Booking,
    ) -> RepositoryResult<Booking> {
        if booking.end <= booking.start {
            return Err(RepositoryError::validation(
                "Booking end must be after start",
            ));
        }
        self.with_partition_mut(session, "insert_booking", |p| {
            let mut stored = booking.clone();
            stored.id = BookingId::new(p.next_id());
            p.bookings.push(stored.clone());
            stored
        })
    }

    async fn set_booking_status(
        &self,
        session: &TenantSession,
        id: BookingId,
        status: BookingStatus,
    ) -> RepositoryResult<()> {
        self.with_partition_mut(session, "set_booking_status", |p| {
            match p.bookings.iter_mut().find(|b| b.id == id) {
                Some(booking) => {
                    booking.status = status;
                    Ok(())
                }
                None => Err(RepositoryError::not_found_with_context(
                    "Booking not found",
                    ErrorContext::new("set_booking_status")
                        .with_entity("booking")
                        .with_entity_id(id.0)
                        .with_partition(session.schema()),
                )),
            }
        })?
    }
}

#[async_trait]
impl CapacityRepository for LocalRepository {
    async fn active_capacity(&self, session: &TenantSession) -> RepositoryResult<u32> {
        self.with_partition(session, "active_capacity", |p| {
            p.posts.iter().filter(|post| post.active).count() as u32
        })
    }

    async fn list_posts(&self, session: &TenantSession) -> RepositoryResult<Vec<Post>> {
        self.with_partition(session, "list_posts", |p| p.posts.clone())
    }

    async fn insert_post(&self, session: &TenantSession, post: &Post) -> RepositoryResult<Post> {
        self.with_partition_mut(session, "insert_post", |p| {
            let mut stored = post.clone();
            stored.id = PostId::new(p.next_id());
            p.posts.push(stored.clone());
            stored
        })
    }

    async fn set_post_active(
        &self,
        session: &TenantSession,
        id: PostId,
        active: bool,
    ) -> RepositoryResult<()> {
        self.with_partition_mut(session, "set_post_active", |p| {
            match p.posts.iter_mut().find(|post| post.id == id) {
                Some(post) => {
                    post.active = active;
                    Ok(())
                }
                None => Err(RepositoryError::not_found_with_context(
                    "Post not found",
                    ErrorContext::new("set_post_active")
                        .with_entity("post")
                        .with_entity_id(id.0)
                        .with_partition(session.schema()),
                )),
            }
        })?
    }
}

#[async_trait]
impl BlackoutRepository for LocalRepository {
    async fn blackouts_for_date(
        &self,
        session: &TenantSession,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<BlockedSlot>> {
        self.with_partition(session, "blackouts_for_date", |p| {
            p.blackouts
                .iter()
                .filter(|b| b.applies_on(date))
                .cloned()
                .collect()
        })
    }

    async fn insert_blackout(
        &self,
        session: &TenantSession,
        slot: &BlockedSlot,
    ) -> RepositoryResult<BlockedSlot> {
        if slot.date_to < slot.date_from {
            return Err(RepositoryError::validation(
                "Blackout date range is inverted",
            ));
        }
        self.with_partition_mut(session, "insert_blackout", |p| {
            let mut stored = slot.clone();
            stored.id = p.next_id();
            p.blackouts.push(stored.clone());
            stored
        })
    }

    async fn remove_blackout(&self, session: &TenantSession, id: i64) -> RepositoryResult<()> {
        self.with_partition_mut(session, "remove_blackout", |p| {
            p.blackouts.retain(|b| b.id != id);
        })
    }
}

#[async_trait]
impl MasterRepository for LocalRepository {
    async fn list_masters(&self, session: &TenantSession) -> RepositoryResult<Vec<Master>> {
        self.with_partition(session, "list_masters", |p| p.masters.clone())
    }

    async fn insert_master(
        &self,
        session: &TenantSession,
        master: &Master,
    ) -> RepositoryResult<Master> {
        self.with_partition_mut(session, "insert_master", |p| {
            let mut stored = master.clone();
            stored.id = MasterId::new(p.next_id());
            p.masters.push(stored.clone());
            stored
        })
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
