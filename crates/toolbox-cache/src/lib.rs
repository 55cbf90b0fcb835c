//! # Toolbox Cache
//!
//! Redis-backed caching of per-role permission projections.
//!
//! This crate provides:
//! - Redis connection management
//! - Cache operations (get, set, delete, invalidate by pattern)
//! - Cache configuration from environment variables
//! - Key builders and invalidation helpers for permission data
//!
//! The cache is advisory. Every write to permissions or roles invalidates the
//! affected keys, and a cache failure never fails the request that hit it.
//!
//! # Example
//!
//! ```ignore
//! use toolbox_cache::{CacheConfig, RedisCache};
//!
//! let config = CacheConfig::from_env();
//! let cache = RedisCache::connect(&config).await?;
//!
//! let key = cache.keys().role_permissions(1);
//! cache.set(&key, &records).await?;
//! let cached: Option<Vec<PermissionRecord>> = cache.get(&key).await;
//! ```

pub mod config;
pub mod keys;
pub mod store;

pub use config::CacheConfig;
pub use keys::{CacheKeys, hash_key_parts, invalidate};
pub use store::{CacheError, RedisCache};
