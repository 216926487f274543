//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::scheduler::Scheduler;
use crate::tenancy::{Provisioner, TenantResolver, TenantTokenKey};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    /// Availability facade
    pub scheduler: Arc<Scheduler>,
    /// Partition lifecycle coordinator
    pub provisioner: Arc<Provisioner>,
}

impl AppState {
    /// Create application state around the given repository.
    ///
    /// The tenant resolver picks up the signed-token secret from the
    /// environment when one is configured; without it, token resolution is
    /// rejected and only explicit tenant ids are accepted.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        let mut resolver = TenantResolver::new();
        if let Some(key) = TenantTokenKey::from_env() {
            resolver = resolver.with_token_key(key);
        }

        let scheduler = Arc::new(Scheduler::new(Arc::clone(&repository)).with_resolver(resolver));
        let provisioner = Arc::new(Provisioner::new(Arc::clone(&repository)));

        Self {
            repository,
            scheduler,
            provisioner,
        }
    }
}
