// Cache manager - fingerprints prompts and applies the fail-open policy
// Author: kelexine (https://github.com/kelexine)

use super::backend::CacheBackend;
use super::fingerprint::fingerprint;
use super::memory::MemoryBackend;
use super::models::CacheStats;
use super::redis_backend::RedisBackend;
use crate::config::{CacheBackendKind, CacheConfig};
use crate::error::{Result, ServiceError};
use crate::metrics;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Response cache in front of a single backend.
///
/// Backend failures never reach the caller: a failed lookup is a miss and a
/// failed store is dropped. Each absorbed failure is logged with its kind so
/// an outage is distinguishable from an empty cache.
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    stats: Mutex<CacheStats>,
}

impl CacheManager {
    /// Create a cache manager over an explicit backend
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Build the backend selected in configuration
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendKind::Memory => Arc::new(MemoryBackend::new()),
            CacheBackendKind::Redis => {
                let timeout = Duration::from_millis(config.operation_timeout_ms);
                let redis = RedisBackend::new(&config.redis_url, timeout)
                    .map_err(|e| ServiceError::Config(format!("cache.redis_url: {}", e)))?;
                Arc::new(redis)
            }
        };
        info!("Using {} cache backend", backend.kind());
        Ok(Self::new(backend, config.ttl()))
    }

    /// Expiry attached to every stored entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Backend kind, fixed for the process lifetime
    pub fn kind(&self) -> CacheBackendKind {
        self.backend.kind()
    }

    /// Look up the stored completion for `text`
    pub async fn get(&self, text: &str) -> Option<String> {
        let key = fingerprint(text);
        let kind = self.kind().as_str();

        match self.backend.get(&key).await {
            Ok(Some(value)) => {
                debug!("Cache hit for key: {}", &key[..16]);
                self.stats.lock().hits += 1;
                metrics::record_cache_operation(kind, "hit");
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss for key: {}", &key[..16]);
                self.stats.lock().misses += 1;
                metrics::record_cache_operation(kind, "miss");
                None
            }
            Err(e) => {
                warn!(
                    backend = kind,
                    error_kind = e.kind(),
                    "Cache lookup failed, treating as miss: {}",
                    e
                );
                {
                    let mut stats = self.stats.lock();
                    stats.misses += 1;
                    stats.errors += 1;
                }
                metrics::record_cache_operation(kind, "error");
                metrics::record_cache_operation(kind, "miss");
                None
            }
        }
    }

    /// Store `response` for `text`. Returns whether the backend accepted it.
    pub async fn set(&self, text: &str, response: &str) -> bool {
        let key = fingerprint(text);
        let kind = self.kind().as_str();

        match self.backend.set(&key, response, self.ttl).await {
            Ok(()) => {
                debug!("Cached response for key: {}", &key[..16]);
                self.stats.lock().stores += 1;
                metrics::record_cache_operation(kind, "store");
                true
            }
            Err(e) => {
                warn!(
                    backend = kind,
                    error_kind = e.kind(),
                    "Cache store failed, dropping entry: {}",
                    e
                );
                self.stats.lock().errors += 1;
                metrics::record_cache_operation(kind, "error");
                false
            }
        }
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use async_trait::async_trait;

    struct BrokenBackend;

    /// Memory-like backend remembering the TTL of every write.
    #[derive(Default)]
    struct TtlRecordingBackend {
        inner: MemoryBackend,
        ttls: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl CacheBackend for TtlRecordingBackend {
        fn kind(&self) -> CacheBackendKind {
            CacheBackendKind::Redis
        }

        async fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str, ttl: Duration) -> std::result::Result<(), CacheError> {
            self.ttls.lock().push(ttl);
            self.inner.set(key, value, ttl).await
        }
    }

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        fn kind(&self) -> CacheBackendKind {
            CacheBackendKind::Redis
        }

        async fn get(&self, _key: &str) -> std::result::Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> std::result::Result<(), CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(5)))
        }
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let cache = CacheManager::new(Arc::new(MemoryBackend::new()), Duration::from_secs(60));

        assert_eq!(cache.get("Hello").await, None);
        assert!(cache.set("Hello", "world").await);
        assert_eq!(cache.get("Hello").await, Some("world".to_string()));
        assert_eq!(cache.get("Hello ").await, None);

        let stats = cache.get_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.stores, 1);
        assert_eq!(stats.errors, 0);
    }

    #[tokio::test]
    async fn test_broken_backend_fails_open() {
        let cache = CacheManager::new(Arc::new(BrokenBackend), Duration::from_secs(60));

        assert!(!cache.set("Hello", "world").await);
        assert_eq!(cache.get("Hello").await, None);

        let stats = cache.get_stats();
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_from_config_rejects_bad_redis_url() {
        let config = CacheConfig {
            backend: CacheBackendKind::Redis,
            redis_url: "definitely not a url".to_string(),
            ..CacheConfig::default()
        };
        assert!(matches!(
            CacheManager::from_config(&config),
            Err(ServiceError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_configured_ttl_reaches_backend() {
        let config = CacheConfig {
            ttl_seconds: 90,
            ..CacheConfig::default()
        };
        let backend = Arc::new(TtlRecordingBackend::default());
        let cache = CacheManager::new(backend.clone(), config.ttl());

        assert!(cache.set("Hello", "world").await);
        assert!(cache.set("Hello", "again").await);

        assert_eq!(
            *backend.ttls.lock(),
            vec![Duration::from_secs(90), Duration::from_secs(90)]
        );
        assert_eq!(cache.get("Hello").await.as_deref(), Some("again"));
    }

    #[tokio::test]
    async fn test_default_ttl_is_one_hour() {
        let backend = Arc::new(TtlRecordingBackend::default());
        let cache = CacheManager::new(backend.clone(), CacheConfig::default().ttl());

        cache.set("prompt", "completion").await;
        assert_eq!(*backend.ttls.lock(), vec![Duration::from_secs(3600)]);
    }

    #[test]
    fn test_from_config_memory() {
        let cache = CacheManager::from_config(&CacheConfig::default()).unwrap();
        assert_eq!(cache.kind(), CacheBackendKind::Memory);
        assert_eq!(cache.ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_from_config_redis_carries_ttl() {
        let config = CacheConfig {
            backend: CacheBackendKind::Redis,
            ttl_seconds: 42,
            ..CacheConfig::default()
        };
        let cache = CacheManager::from_config(&config).unwrap();
        assert_eq!(cache.kind(), CacheBackendKind::Redis);
        assert_eq!(cache.ttl(), Duration::from_secs(42));
    }
}
