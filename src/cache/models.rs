//! Cache statistics models.

// Author: kelexine (https://github.com/kelexine)

use serde::Serialize;

/// Counters for cache operations since process start.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a stored completion.
    pub hits: u64,
    /// Lookups that found nothing, including absorbed backend failures.
    pub misses: u64,
    /// Completions written successfully.
    pub stores: u64,
    /// Backend failures absorbed on either path.
    pub errors: u64,
}
