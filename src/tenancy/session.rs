//! Tenant-bound session handles.
//!
//! A [`TenantSession`] is the only value the repository layer accepts for
//! tenant-scoped work. It is deliberately an explicit parameter rather than
//! ambient state: a call site that forgets it does not compile, so a missed
//! context switch cannot leak rows across tenants.

use crate::models::{Tenant, TenantId};

/// Prefix of every tenant partition name.
pub const SCHEMA_PREFIX: &str = "tenant_";

/// Derive the partition (schema) name for a tenant id.
///
/// Always of the form `tenant_<uuid-simple>`, which satisfies
/// [`is_valid_schema_name`] by construction.
pub fn schema_name_for(id: TenantId) -> String {
    format!("{}{}", SCHEMA_PREFIX, id.0.simple())
}

/// Validate a partition name before it is interpolated into DDL.
///
/// Only lowercase alphanumerics and underscores, starting with the tenant
/// prefix. Everything else is rejected, which keeps schema identifiers out of
/// SQL-injection territory even if a registry row was tampered with.
pub fn is_valid_schema_name(name: &str) -> bool {
    name.starts_with(SCHEMA_PREFIX)
        && name.len() > SCHEMA_PREFIX.len()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Handle binding storage operations to one tenant's partition.
///
/// Constructed only from a registry [`Tenant`] record; there is no way to
/// conjure a session for an arbitrary schema string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSession {
    tenant_id: TenantId,
    schema: String,
}

impl TenantSession {
    /// Bind to the partition recorded for this tenant.
    ///
    /// Returns `None` when the record carries a malformed partition name.
    pub fn bind(tenant: &Tenant) -> Option<Self> {
        if !is_valid_schema_name(&tenant.schema_name) {
            return None;
        }
        Some(Self {
            tenant_id: tenant.id,
            schema: tenant.schema_name.clone(),
        })
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Partition name all queries through this session are routed to.
    pub fn schema(&self) -> &str {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_name_shape() {
        let id = TenantId::new();
        let name = schema_name_for(id);
        assert!(name.starts_with(SCHEMA_PREFIX));
        assert!(is_valid_schema_name(&name));
        // uuid simple form: 32 hex chars
        assert_eq!(name.len(), SCHEMA_PREFIX.len() + 32);
    }

    #[test]
    fn test_schema_name_validation() {
        assert!(is_valid_schema_name("tenant_abc123"));
        assert!(!is_valid_schema_name("tenant_"));
        assert!(!is_valid_schema_name("public"));
        assert!(!is_valid_schema_name("tenant_ABC"));
        assert!(!is_valid_schema_name("tenant_a; drop schema public"));
        assert!(!is_valid_schema_name("tenant_a-b"));
    }

    #[test]
    fn test_bind_rejects_malformed_partition() {
        let mut tenant = Tenant::new("acme");
        assert!(TenantSession::bind(&tenant).is_some());

        tenant.schema_name = "public".to_string();
        assert!(TenantSession::bind(&tenant).is_none());
    }

    #[test]
    fn test_bind_carries_tenant_identity() {
        let tenant = Tenant::new("acme");
        let session = TenantSession::bind(&tenant).unwrap();
        assert_eq!(session.tenant_id(), tenant.id);
        assert_eq!(session.schema(), tenant.schema_name);
    }
}
