//! Tenant routing: resolution, tenant-bound sessions, and partition
//! lifecycle.
//!
//! The isolation contract of the whole crate lives here. A request is
//! resolved to a [`crate::models::TenantId`] (never defaulted), the tenant's
//! registry record is looked up, and a [`session::TenantSession`] is bound to
//! its partition. Every repository call downstream takes that session
//! explicitly; nothing in the crate holds a "current tenant" globally.

pub mod provisioning;
pub mod resolver;
pub mod session;

pub use provisioning::Provisioner;
pub use resolver::{RequestContext, TenantResolver, TenantTokenKey};
pub use session::TenantSession;

use crate::db::repository::RepositoryError;
use crate::models::TenantId;

/// Errors raised while routing a request to a tenant or managing its
/// partition lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    /// No tenant could be resolved from the request. Caller error; no
    /// default tenant is ever assumed.
    #[error("No tenant could be resolved from the request")]
    MissingTenant,

    /// A signed tenant credential was presented but is malformed or forged.
    #[error("Invalid tenant credential")]
    InvalidToken,

    /// A lifecycle operation is already in flight for this tenant; retry
    /// after it completes.
    #[error("Partition lifecycle operation already in flight for tenant {tenant}")]
    ProvisionConflict { tenant: TenantId },

    /// The resolved tenant is not registered.
    #[error("Unknown tenant {tenant}")]
    UnknownTenant { tenant: TenantId },

    /// The tenant's registry record carries a malformed partition name.
    #[error("Tenant {tenant} has a malformed partition name")]
    CorruptPartitionName { tenant: TenantId },

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}
