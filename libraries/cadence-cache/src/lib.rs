//! Cadence Cache
//!
//! Response cache used by the HTTP handlers.
//!
//! Values are JSON strings stored under keys built by [`keys`]. Writes invalidate
//! by glob pattern (`artist_*`, `artists_list:*`) rather than tracking
//! individual keys. The cache is best-effort: [`get_json`], [`set_json`] and
//! [`invalidate`] log backend failures and carry on.

mod error;
mod helpers;
pub mod keys;
mod memory;
mod redis_cache;

pub use error::{CacheError, Result};
pub use helpers::{get_json, invalidate, invalidate_kind, set_json};
pub use keys::EntityKind;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

use async_trait::async_trait;
use std::time::Duration;

/// Key/value backend holding serialized responses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value`, expiring after `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Returns whether the key existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Delete several keys, returning how many existed
    async fn delete_many(&self, keys: &[String]) -> Result<usize>;

    /// Delete every key matching a Redis `MATCH` glob (`*`, `?`, `[...]` and
    /// `\` escapes). Returns the number of keys removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize>;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<()>;
}
