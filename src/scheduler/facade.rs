//! Scheduling facade: the single operation external callers need.
//!
//! Composes tenant routing, slot generation, and availability checking into
//! "list bookable slots for tenant X, date D, duration M". Read-only and
//! idempotent; safe to call repeatedly.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{BookingWindow, MasterId, Slot, TenantId};
use crate::tenancy::{RequestContext, TenantError, TenantResolver, TenantSession};

use super::availability;
use super::slots::SlotGrid;

/// Errors a slot-listing request can fail with.
///
/// An empty slot list is a successful answer ("nothing is bookable"); these
/// errors mean the system could not determine availability at all, so callers
/// can always tell the two apart.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// No tenant could be resolved; no default is ever assumed.
    #[error("No tenant could be resolved from the request")]
    MissingTenant,

    /// A signed tenant credential was presented but is malformed or forged.
    #[error("Invalid tenant credential")]
    InvalidToken,

    /// Storage could not be consulted for the whole request.
    #[error("Availability could not be determined: {0}")]
    StorageUnavailable(#[source] RepositoryError),
}

impl From<TenantError> for SchedulingError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::MissingTenant => SchedulingError::MissingTenant,
            TenantError::InvalidToken => SchedulingError::InvalidToken,
            // An id that resolves to no registry row is indistinguishable
            // from an unresolvable request at this boundary
            TenantError::UnknownTenant { .. } => SchedulingError::MissingTenant,
            TenantError::CorruptPartitionName { tenant } => SchedulingError::StorageUnavailable(
                RepositoryError::validation(format!("Malformed partition name for {}", tenant)),
            ),
            TenantError::ProvisionConflict { tenant } => SchedulingError::StorageUnavailable(
                RepositoryError::internal(format!("Lifecycle operation in flight for {}", tenant)),
            ),
            TenantError::Storage(e) => SchedulingError::StorageUnavailable(e),
        }
    }
}

/// Result of a slot-listing request.
#[derive(Debug, Clone, Default)]
pub struct AvailableSlots {
    /// Bookable slots in ascending start-time order.
    pub slots: Vec<Slot>,
    /// Candidates omitted because their availability check failed storage-
    /// side. Non-zero means the list may be incomplete; the slots present are
    /// still correct.
    pub failed_checks: usize,
}

impl AvailableSlots {
    fn empty() -> Self {
        Self::default()
    }
}

/// Scheduling facade over a repository and a tenant resolver.
#[derive(Clone)]
pub struct Scheduler {
    repository: Arc<dyn FullRepository>,
    resolver: TenantResolver,
}

impl Scheduler {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            resolver: TenantResolver::new(),
        }
    }

    /// Replace the default resolver (e.g. to enable signed-token support).
    pub fn with_resolver(mut self, resolver: TenantResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repository
    }

    /// List bookable slots, resolving the tenant from a request context.
    pub async fn list_available_slots(
        &self,
        ctx: &RequestContext,
        date: NaiveDate,
        duration_minutes: u32,
        window: BookingWindow,
        master: Option<MasterId>,
    ) -> Result<AvailableSlots, SchedulingError> {
        let tenant_id = self.resolver.resolve(ctx)?;
        self.list_available_slots_for(tenant_id, date, duration_minutes, window, master)
            .await
    }

    /// List bookable slots for an already-resolved tenant.
    ///
    /// Inactive tenants and tenants whose subscription has lapsed get an
    /// empty list, not an error: "no times available" is the contractual
    /// answer for them. A single candidate whose check fails storage-side is
    /// omitted (fail closed) and counted in `failed_checks`; when storage is
    /// unreachable for the whole request, `StorageUnavailable` propagates
    /// instead of an empty-but-successful result.
    pub async fn list_available_slots_for(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
        duration_minutes: u32,
        window: BookingWindow,
        master: Option<MasterId>,
    ) -> Result<AvailableSlots, SchedulingError> {
        let tenant = self
            .repository
            .find_tenant(tenant_id)
            .await
            .map_err(SchedulingError::StorageUnavailable)?
            .ok_or(SchedulingError::MissingTenant)?;

        if !tenant.active || !tenant.can_book {
            debug!(tenant = %tenant.id, active = tenant.active, can_book = tenant.can_book,
                "tenant not bookable, returning no slots");
            return Ok(AvailableSlots::empty());
        }

        let session = TenantSession::bind(&tenant).ok_or_else(|| {
            SchedulingError::from(TenantError::CorruptPartitionName { tenant: tenant.id })
        })?;

        // Zero capacity short-circuits before any candidate is enumerated
        let capacity = self
            .repository
            .active_capacity(&session)
            .await
            .map_err(SchedulingError::StorageUnavailable)?;
        if capacity == 0 {
            debug!(tenant = %tenant.id, "no active posts, returning no slots");
            return Ok(AvailableSlots::empty());
        }

        let mut result = AvailableSlots::empty();
        let mut candidates = 0usize;
        let mut last_error: Option<RepositoryError> = None;

        for slot in SlotGrid::new(window, duration_minutes) {
            candidates += 1;
            match availability::is_available(
                self.repository.as_ref(),
                &session,
                date,
                slot.range(),
                master,
            )
            .await
            {
                Ok(true) => result.slots.push(slot),
                Ok(false) => {}
                Err(e) => {
                    // Fail closed: omit the slot rather than overbook
                    warn!(tenant = %tenant.id, date = %date, slot = %slot.range(),
                        error = %e, "availability check failed, omitting slot");
                    result.failed_checks += 1;
                    last_error = Some(e);
                }
            }
        }

        // Every single check failing means storage is effectively down
        if candidates > 0 && result.failed_checks == candidates {
            if let Some(e) = last_error {
                return Err(SchedulingError::StorageUnavailable(e));
            }
        }

        Ok(result)
    }
}
