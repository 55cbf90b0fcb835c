//! Cache key generation and invalidation helpers.

use std::fmt::Display;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::RedisCache;

/// Builds keys under a configured prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn build(&self, parts: &[&str]) -> String {
        format!("{}:{}", self.prefix, parts.join(":"))
    }

    /// Explicit permission records of one role.
    pub fn role_permissions(&self, role_id: impl Display) -> String {
        self.build(&["permissions", "role", &role_id.to_string()])
    }

    /// Union of permissions over a set of roles, keyed by a hash of the set.
    pub fn effective_permissions(&self, roles_hash: &str) -> String {
        self.build(&["permissions", "effective", roles_hash])
    }

    pub fn effective_invalidation_pattern(&self) -> String {
        format!("{}:permissions:effective:*", self.prefix)
    }
}

/// Stable short hash of a serializable value, identical across processes.
pub fn hash_key_parts<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    hex::encode(&digest[..8])
}

/// Invalidation helpers. Failures are logged and never surface to callers.
pub mod invalidate {
    use super::*;

    /// Call after any permission of `role_id` changes or the role is deleted.
    pub async fn role_permissions(cache: Option<&RedisCache>, role_id: impl Display) {
        let Some(cache) = cache else { return };
        let role_id = role_id.to_string();

        if let Err(e) = cache
            .invalidate(&cache.keys().role_permissions(&role_id))
            .await
        {
            warn!(error = %e, role_id = %role_id, "Failed to invalidate role permission cache");
        }

        // Any effective projection may include this role.
        if let Err(e) = cache
            .invalidate_pattern(&cache.keys().effective_invalidation_pattern())
            .await
        {
            warn!(error = %e, "Failed to invalidate effective permission caches");
        }
    }
}
