//! Repository traits for the scheduling core.
//!
//! Every tenant-scoped operation takes a [`TenantSession`] handle. The
//! session is the isolation boundary: it carries the tenant's partition name,
//! and implementations must route the query to that partition and nowhere
//! else. There is no ambient "current tenant" anywhere in the crate.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{
    BlockedSlot, Booking, BookingStatus, Master, MasterId, Post, PostId, Tenant, TenantId,
    TimeRange,
};
use crate::tenancy::session::TenantSession;

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Registry of tenants and the lifecycle of their storage partitions.
///
/// Tenant records themselves are owned by billing/administration; this trait
/// only reads them and manages the partition that hangs off each record.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Look up a tenant by id.
    ///
    /// Returns `Ok(None)` when the tenant is not registered; storage failures
    /// surface as errors.
    async fn find_tenant(&self, id: TenantId) -> RepositoryResult<Option<Tenant>>;

    /// Look up a tenant by its unique slug.
    async fn find_tenant_by_slug(&self, slug: &str) -> RepositoryResult<Option<Tenant>>;

    /// List all registered tenants.
    async fn list_tenants(&self) -> RepositoryResult<Vec<Tenant>>;

    /// Register a tenant record. Does not provision its partition.
    async fn insert_tenant(&self, tenant: &Tenant) -> RepositoryResult<()>;

    /// Flip the billing-derived booking capability flag.
    async fn set_booking_capability(&self, id: TenantId, can_book: bool) -> RepositoryResult<()>;

    /// Create the tenant's partition and its working tables, empty of data.
    ///
    /// Idempotent: provisioning an already-provisioned tenant is a no-op
    /// returning success. Provisioning an unregistered tenant is `NotFound`.
    async fn provision(&self, id: TenantId) -> RepositoryResult<()>;

    /// Destroy the tenant's partition and all contained data irreversibly.
    ///
    /// Idempotent against a partition that does not exist.
    async fn deprovision(&self, id: TenantId) -> RepositoryResult<()>;

    /// Whether the tenant's partition currently exists.
    async fn partition_exists(&self, id: TenantId) -> RepositoryResult<bool>;
}

/// Bookings inside one tenant partition.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Fetch capacity-consuming bookings on `date` whose interval intersects
    /// `range` under half-open semantics, optionally restricted to one master.
    ///
    /// Cancelled and completed bookings are never returned.
    async fn bookings_overlapping(
        &self,
        session: &TenantSession,
        date: NaiveDate,
        range: TimeRange,
        master: Option<MasterId>,
    ) -> RepositoryResult<Vec<Booking>>;

    /// All bookings on a date regardless of status.
    async fn bookings_for_date(
        &self,
        session: &TenantSession,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Booking>>;

    /// Insert a booking and return it with its assigned id.
    async fn insert_booking(
        &self,
        session: &TenantSession,
        booking: &Booking,
    ) -> RepositoryResult<Booking>;

    /// Transition a booking's status.
    async fn set_booking_status(
        &self,
        session: &TenantSession,
        id: crate::models::BookingId,
        status: BookingStatus,
    ) -> RepositoryResult<()>;
}

/// Capacity units ("posts") inside one tenant partition.
#[async_trait]
pub trait CapacityRepository: Send + Sync {
    /// Number of active posts: the tenant's concurrent-service capacity.
    async fn active_capacity(&self, session: &TenantSession) -> RepositoryResult<u32>;

    /// All posts, active or not.
    async fn list_posts(&self, session: &TenantSession) -> RepositoryResult<Vec<Post>>;

    /// Create a post and return it with its assigned id.
    async fn insert_post(&self, session: &TenantSession, post: &Post) -> RepositoryResult<Post>;

    /// Activate or deactivate a post.
    async fn set_post_active(
        &self,
        session: &TenantSession,
        id: PostId,
        active: bool,
    ) -> RepositoryResult<()>;
}

/// Blackout windows inside one tenant partition.
#[async_trait]
pub trait BlackoutRepository: Send + Sync {
    /// Blackout windows in force on the given date.
    async fn blackouts_for_date(
        &self,
        session: &TenantSession,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<BlockedSlot>>;

    /// Declare a blackout window and return it with its assigned id.
    async fn insert_blackout(
        &self,
        session: &TenantSession,
        slot: &BlockedSlot,
    ) -> RepositoryResult<BlockedSlot>;

    /// Remove a blackout window. Removing a non-existent one is a no-op.
    async fn remove_blackout(&self, session: &TenantSession, id: i64) -> RepositoryResult<()>;
}

/// Providers ("masters") inside one tenant partition.
#[async_trait]
pub trait MasterRepository: Send + Sync {
    /// All providers.
    async fn list_masters(&self, session: &TenantSession) -> RepositoryResult<Vec<Master>>;

    /// Create a provider and return it with its assigned id.
    async fn insert_master(
        &self,
        session: &TenantSession,
        master: &Master,
    ) -> RepositoryResult<Master>;
}

/// Full repository surface the scheduling facade and the HTTP layer work
/// against.
#[async_trait]
pub trait FullRepository:
    TenantDirectory + BookingRepository + CapacityRepository + BlackoutRepository + MasterRepository
{
    /// Verify the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
