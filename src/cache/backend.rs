// Cache backend abstraction
// Author: kelexine (https://github.com/kelexine)

use crate::config::CacheBackendKind;
use crate::error::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Storage behind the response cache, keyed by prompt fingerprint.
///
/// Implementations report failures as [`CacheError`]; the decision to fail
/// open is taken by [`super::CacheManager`], not here.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Which backend this is, as reported by `/health`.
    fn kind(&self) -> CacheBackendKind;

    /// Look up a stored completion.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a completion. Backends without expiry ignore `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}
