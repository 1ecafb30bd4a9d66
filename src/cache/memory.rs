// In-process cache backend
// Author: kelexine (https://github.com/kelexine)

use super::backend::CacheBackend;
use crate::config::CacheBackendKind;
use crate::error::CacheError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

/// Unbounded map held for the lifetime of the process. No expiry, no eviction.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn kind(&self) -> CacheBackendKind {
        CacheBackendKind::Memory
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), CacheError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("k").await.unwrap(), None);

        backend.set("k", "v", Duration::from_secs(1)).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_single_entry() {
        let backend = MemoryBackend::new();
        backend.set("k", "first", Duration::ZERO).await.unwrap();
        backend.set("k", "second", Duration::ZERO).await.unwrap();

        assert_eq!(backend.get("k").await.unwrap(), Some("second".to_string()));
        assert_eq!(backend.len(), 1);
    }
}
