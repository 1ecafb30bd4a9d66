// Redis cache backend
// Author: kelexine (https://github.com/kelexine)

use super::backend::CacheBackend;
use crate::config::CacheBackendKind;
use crate::error::CacheError;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use parking_lot::Mutex;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::debug;

/// How long a failed connect attempt suppresses new ones.
pub const RECONNECT_COOLDOWN: Duration = Duration::from_secs(5);

/// Expiry passed to `SETEX`, which rejects zero.
fn setex_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Networked backend storing entries with `SETEX`.
///
/// The connection is established lazily on first use, so an unreachable
/// server at startup does not stop the process. Every round-trip, including
/// connecting, is bounded by the configured operation timeout. After a
/// connect attempt that does not succeed, operations fail immediately for
/// [`RECONNECT_COOLDOWN`] instead of waiting out the timeout again.
pub struct RedisBackend {
    client: redis::Client,
    manager: OnceCell<ConnectionManager>,
    op_timeout: Duration,
    last_connect_attempt: Mutex<Option<Instant>>,
}

impl RedisBackend {
    /// Validate the URL and prepare a client. Does not connect.
    pub fn new(url: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            manager: OnceCell::new(),
            op_timeout,
            last_connect_attempt: Mutex::new(None),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        if let Some(manager) = self.manager.get() {
            return Ok(manager.clone());
        }

        {
            // An attempt cut short by the operation timeout never reports back,
            // so the start time is recorded up front and cleared on success.
            let mut last = self.last_connect_attempt.lock();
            if let Some(at) = *last {
                if at.elapsed() < RECONNECT_COOLDOWN {
                    return Err(CacheError::Backend(
                        "Redis unreachable, waiting before reconnecting".to_string(),
                    ));
                }
            }
            *last = Some(Instant::now());
        }

        let manager = self
            .manager
            .get_or_try_init(|| async {
                debug!("Opening Redis connection");
                ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(CacheError::from)
            })
            .await?;
        *self.last_connect_attempt.lock() = None;
        Ok(manager.clone())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))?
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn kind(&self) -> CacheBackendKind {
        CacheBackendKind::Redis
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let value = redis::cmd("GET")
                .arg(key)
                .query_async::<_, Option<String>>(&mut conn)
                .await?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let seconds = setex_seconds(ttl);
        self.bounded(async {
            let mut conn = self.connection().await?;
            redis::cmd("SETEX")
                .arg(key)
                .arg(seconds)
                .arg(value)
                .query_async::<_, ()>(&mut conn)
                .await?;
            Ok(())
        })
        .await
    }
}
