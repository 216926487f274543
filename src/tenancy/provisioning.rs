//! Partition lifecycle orchestration.
//!
//! Provisioning and teardown are low-frequency administrative operations, but
//! a billing workflow bug could still fire both for the same tenant at once.
//! The [`Provisioner`] serializes lifecycle operations per tenant: a second
//! operation arriving while one is in flight is rejected with
//! [`TenantError::ProvisionConflict`] and must be retried after the first
//! completes. The underlying storage operations are themselves idempotent, so
//! retries are always safe.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::db::repository::FullRepository;
use crate::models::TenantId;

use super::TenantError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleOp {
    Provision,
    Teardown,
}

/// Serializes partition lifecycle operations per tenant.
pub struct Provisioner {
    repository: Arc<dyn FullRepository>,
    in_flight: Arc<Mutex<HashMap<TenantId, LifecycleOp>>>,
}

impl Provisioner {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create the tenant's partition with its working tables, empty of data.
    ///
    /// Idempotent against an already-provisioned partition.
    pub async fn provision(&self, tenant: TenantId) -> Result<(), TenantError> {
        let _guard = self.begin(tenant, LifecycleOp::Provision)?;
        self.repository.provision(tenant).await?;
        info!(tenant = %tenant, "tenant partition provisioned");
        Ok(())
    }

    /// Destroy the tenant's partition and everything in it.
    ///
    /// Idempotent against a partition that does not exist.
    pub async fn deprovision(&self, tenant: TenantId) -> Result<(), TenantError> {
        let _guard = self.begin(tenant, LifecycleOp::Teardown)?;
        self.repository.deprovision(tenant).await?;
        info!(tenant = %tenant, "tenant partition destroyed");
        Ok(())
    }

    fn begin(&self, tenant: TenantId, op: LifecycleOp) -> Result<InFlightGuard, TenantError> {
        let mut in_flight = self.in_flight.lock();
        if in_flight.contains_key(&tenant) {
            return Err(TenantError::ProvisionConflict { tenant });
        }
        in_flight.insert(tenant, op);
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            tenant,
        })
    }
}

/// Clears the in-flight marker when the operation finishes, success or not.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashMap<TenantId, LifecycleOp>>>,
    tenant: TenantId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.tenant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_detection() {
        // Exercise the guard bookkeeping directly; the async paths are
        // covered by the tenancy integration tests.
        let repo: Arc<dyn FullRepository> =
            Arc::new(crate::db::repositories::LocalRepository::new());
        let provisioner = Provisioner::new(repo);
        let tenant = TenantId::new();

        let guard = provisioner.begin(tenant, LifecycleOp::Provision).unwrap();
        assert!(matches!(
            provisioner.begin(tenant, LifecycleOp::Teardown),
            Err(TenantError::ProvisionConflict { .. })
        ));

        // Another tenant is unaffected
        let other = TenantId::new();
        let other_guard = provisioner.begin(other, LifecycleOp::Provision).unwrap();
        drop(other_guard);

        drop(guard);
        // After completion the tenant is free again
        let _ = provisioner.begin(tenant, LifecycleOp::Teardown).unwrap();
    }
}
