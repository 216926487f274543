//! Tenant resolution.
//!
//! An inbound request may carry its tenant in several forms. Resolution
//! tries them in a fixed order, first match wins:
//!
//! 1. an explicit tenant id supplied by the caller,
//! 2. a tenant id already bound to the request context earlier in its
//!    lifetime,
//! 3. a signed tenant token presented by the caller.
//!
//! There is no default tenant. An unresolvable request is always
//! [`TenantError::MissingTenant`], never a silent fallback, so a broken
//! caller can never be routed into someone else's data.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::TenantId;

use super::TenantError;

/// Per-request carrier of tenant identification inputs.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    explicit: Option<TenantId>,
    bound: Option<TenantId>,
    token: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tenant id named directly by the caller.
    pub fn with_explicit(mut self, id: TenantId) -> Self {
        self.explicit = Some(id);
        self
    }

    /// Tenant id cached from an earlier resolution on this request.
    pub fn with_bound(mut self, id: TenantId) -> Self {
        self.bound = Some(id);
        self
    }

    /// Signed tenant credential presented by the caller.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Record a successful resolution so later lookups on the same request
    /// skip straight to the cached binding.
    pub fn bind(&mut self, id: TenantId) {
        self.bound = Some(id);
    }
}

/// Key for minting and verifying signed tenant tokens.
///
/// Token format: `<tenant-uuid>.<hex sha256(uuid || secret)>`. The credential
/// only authenticates the tenant id it names; it carries no expiry or scope,
/// which is all the scheduler needs from its callers.
#[derive(Clone)]
pub struct TenantTokenKey {
    secret: Vec<u8>,
}

impl TenantTokenKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Read the key from the `TENANT_TOKEN_SECRET` environment variable.
    pub fn from_env() -> Option<Self> {
        std::env::var("TENANT_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| Self::new(s.into_bytes()))
    }

    fn digest(&self, id: TenantId) -> String {
        let mut hasher = Sha256::new();
        hasher.update(id.0.as_bytes());
        hasher.update(&self.secret);
        hex::encode(hasher.finalize())
    }

    /// Mint a token for the given tenant.
    pub fn sign(&self, id: TenantId) -> String {
        format!("{}.{}", id.0, self.digest(id))
    }

    /// Verify a presented token and extract the tenant id.
    pub fn verify(&self, token: &str) -> Result<TenantId, TenantError> {
        let (id_part, signature) = token.split_once('.').ok_or(TenantError::InvalidToken)?;
        let uuid = Uuid::parse_str(id_part).map_err(|_| TenantError::InvalidToken)?;
        let id = TenantId(uuid);
        if self.digest(id) == signature {
            Ok(id)
        } else {
            Err(TenantError::InvalidToken)
        }
    }
}

impl std::fmt::Debug for TenantTokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret
        f.debug_struct("TenantTokenKey").finish_non_exhaustive()
    }
}

/// Resolves a request context to a tenant id.
#[derive(Debug, Clone, Default)]
pub struct TenantResolver {
    token_key: Option<TenantTokenKey>,
}

impl TenantResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable signed-token resolution with the given key.
    pub fn with_token_key(mut self, key: TenantTokenKey) -> Self {
        self.token_key = Some(key);
        self
    }

    /// Resolve the tenant for a request, first match wins.
    ///
    /// A token that is present but malformed or forged fails the whole
    /// resolution with [`TenantError::InvalidToken`] rather than falling
    /// through: a bad credential is a caller error, not an absence.
    pub fn resolve(&self, ctx: &RequestContext) -> Result<TenantId, TenantError> {
        if let Some(id) = ctx.explicit {
            return Ok(id);
        }
        if let Some(id) = ctx.bound {
            return Ok(id);
        }
        if let Some(ref token) = ctx.token {
            let key = self.token_key.as_ref().ok_or(TenantError::InvalidToken)?;
            return key.verify(token);
        }
        Err(TenantError::MissingTenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        let a = TenantId::new();
        let b = TenantId::new();
        let ctx = RequestContext::new().with_explicit(a).with_bound(b);
        let resolver = TenantResolver::new();
        assert_eq!(resolver.resolve(&ctx).unwrap(), a);
    }

    #[test]
    fn test_bound_beats_token() {
        let key = TenantTokenKey::new(b"secret".to_vec());
        let bound = TenantId::new();
        let signed = TenantId::new();
        let ctx = RequestContext::new()
            .with_bound(bound)
            .with_token(key.sign(signed));
        let resolver = TenantResolver::new().with_token_key(key);
        assert_eq!(resolver.resolve(&ctx).unwrap(), bound);
    }

    #[test]
    fn test_token_round_trip() {
        let key = TenantTokenKey::new(b"secret".to_vec());
        let id = TenantId::new();
        let ctx = RequestContext::new().with_token(key.sign(id));
        let resolver = TenantResolver::new().with_token_key(key);
        assert_eq!(resolver.resolve(&ctx).unwrap(), id);
    }

    #[test]
    fn test_forged_token_rejected() {
        let key = TenantTokenKey::new(b"secret".to_vec());
        let other_key = TenantTokenKey::new(b"other".to_vec());
        let id = TenantId::new();
        let ctx = RequestContext::new().with_token(other_key.sign(id));
        let resolver = TenantResolver::new().with_token_key(key);
        assert!(matches!(
            resolver.resolve(&ctx),
            Err(TenantError::InvalidToken)
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let key = TenantTokenKey::new(b"secret".to_vec());
        let resolver = TenantResolver::new().with_token_key(key);
        for token in ["", "garbage", "not-a-uuid.abcdef", "a.b.c"] {
            let ctx = RequestContext::new().with_token(token);
            assert!(
                matches!(resolver.resolve(&ctx), Err(TenantError::InvalidToken)),
                "token {:?} should be invalid",
                token
            );
        }
    }

    #[test]
    fn test_empty_context_is_missing_tenant() {
        let resolver = TenantResolver::new();
        assert!(matches!(
            resolver.resolve(&RequestContext::new()),
            Err(TenantError::MissingTenant)
        ));
    }

    #[test]
    fn test_token_without_key_is_invalid() {
        let key = TenantTokenKey::new(b"secret".to_vec());
        let ctx = RequestContext::new().with_token(key.sign(TenantId::new()));
        let resolver = TenantResolver::new();
        assert!(matches!(
            resolver.resolve(&ctx),
            Err(TenantError::InvalidToken)
        ));
    }
}
