//! Best-effort cache in front of the catalog reads.
//!
//! Every operation degrades to a miss or a no-op when the backend is
//! unavailable; callers never see a cache error. Values are stored as JSON
//! and a value that no longer decodes is treated as a miss.

use dashmap::DashMap;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{CacheConfig, CacheMode};

pub mod keys {
    pub const ALL_COURSES: &str = "courses:all";

    pub fn course(id: i64) -> String {
        format!("courses:{}", id)
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Missing configuration: REDIS_URL")]
    MissingUrl,

    #[error("Cache connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected PING reply: {0}")]
    BadPing(String),

    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Encoding(#[from] serde_json::Error),
}

/// Result of [`Cache::get_or_load`].
#[derive(Debug, PartialEq)]
pub struct Lookup<T> {
    pub value: T,
    pub from_cache: bool,
}

#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Arc<String>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    pub fn new(data: String, ttl: Duration) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

#[derive(Clone)]
pub enum CacheBackend {
    /// Every read misses, every write is dropped.
    Disabled,
    /// Single process, in-memory.
    Local(Arc<DashMap<String, CachedEntry>>),
    Redis(ConnectionManager),
}

#[derive(Clone)]
pub struct Cache {
    backend: CacheBackend,
    default_ttl: Duration,
    op_timeout: Duration,
}

impl Cache {
    pub fn disabled() -> Self {
        Self {
            backend: CacheBackend::Disabled,
            default_ttl: Duration::ZERO,
            op_timeout: Duration::ZERO,
        }
    }

    pub fn local(default_ttl: Duration) -> Self {
        Self {
            backend: CacheBackend::Local(Arc::new(DashMap::new())),
            default_ttl,
            op_timeout: Duration::ZERO,
        }
    }

    /// Every command on `manager` is abandoned after `op_timeout` and
    /// reported as a miss or a dropped write.
    pub fn redis(manager: ConnectionManager, default_ttl: Duration, op_timeout: Duration) -> Self {
        Self {
            backend: CacheBackend::Redis(manager),
            default_ttl,
            op_timeout,
        }
    }

    /// Builds the configured backend. A Redis server that does not answer
    /// PING within the configured attempts disables caching for the life
    /// of the process.
    pub async fn connect(config: &CacheConfig) -> Self {
        match config.mode {
            CacheMode::Disabled => {
                info!("Cache disabled by configuration");
                Self::disabled()
            }
            CacheMode::Local => {
                info!("Using in-process cache");
                Self::local(config.default_ttl())
            }
            CacheMode::Redis => match Self::connect_with_retries(config).await {
                Ok(manager) => {
                    info!("Connected to Redis cache");
                    Self::redis(manager, config.default_ttl(), config.op_timeout())
                }
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, caching disabled");
                    Self::disabled()
                }
            },
        }
    }

    async fn connect_with_retries(config: &CacheConfig) -> Result<ConnectionManager, CacheError> {
        let url = config.redis_url.as_deref().ok_or(CacheError::MissingUrl)?;
        let limit = Duration::from_secs(config.connect_timeout_secs);
        let attempts = config.connect_retries.max(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match tokio::time::timeout(limit, Self::open(url, config)).await {
                Ok(Ok(manager)) => return Ok(manager),
                Ok(Err(e)) => e,
                Err(_) => CacheError::Timeout(limit),
            };
            warn!(attempt, attempts, error = %error, "Redis connection attempt failed");
            if attempt >= attempts {
                return Err(error);
            }
            tokio::time::sleep(Duration::from_secs(config.retry_delay_secs)).await;
        }
    }

    async fn open(url: &str, config: &CacheConfig) -> Result<ConnectionManager, CacheError> {
        let client = redis::Client::open(url)?;
        let settings = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .set_response_timeout(config.op_timeout());
        let mut manager = ConnectionManager::new_with_config(client, settings).await?;
        let pong: String = redis::cmd("PING").query_async(&mut manager).await?;
        if pong != "PONG" {
            return Err(CacheError::BadPing(pong));
        }
        Ok(manager)
    }

    pub fn mode(&self) -> &'static str {
        match self.backend {
            CacheBackend::Disabled => "disabled",
            CacheBackend::Local(_) => "local",
            CacheBackend::Redis(_) => "redis",
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "cached value did not decode, treating as miss");
                None
            }
        }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        if let Err(e) = self.try_set(key, value, ttl).await {
            warn!(key, error = %e, "cache write failed");
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.try_delete(key).await {
            warn!(key, error = %e, "cache delete failed");
        }
    }

    /// Drops every entry. On Redis this flushes the selected database.
    pub async fn clear(&self) {
        if let Err(e) = self.try_clear().await {
            warn!(error = %e, "cache clear failed");
        }
    }

    /// Read-through: the cached value on hit, otherwise the loader's result,
    /// stored best-effort before it is returned.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &str, ttl: Duration, loader: F) -> Result<Lookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key).await {
            return Ok(Lookup { value: hit, from_cache: true });
        }
        let value = loader().await?;
        self.set(key, &value, ttl).await;
        Ok(Lookup { value, from_cache: false })
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        match &self.backend {
            CacheBackend::Disabled => Ok(None),
            CacheBackend::Local(map) => {
                let Some(entry) = map.get(key) else {
                    return Ok(None);
                };
                if entry.is_expired() {
                    drop(entry);
                    map.remove(key);
                    return Ok(None);
                }
                Ok(Some(entry.data.as_ref().clone()))
            }
            CacheBackend::Redis(manager) => {
                let mut conn = manager.clone();
                bounded::<Option<String>, _>(self.op_timeout, conn.get(key)).await
            }
        }
    }

    async fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError> {
        let encoded = serde_json::to_string(value)?;
        match &self.backend {
            CacheBackend::Disabled => {}
            CacheBackend::Local(map) => {
                map.insert(key.to_string(), CachedEntry::new(encoded, ttl));
            }
            CacheBackend::Redis(manager) => {
                let mut conn = manager.clone();
                bounded::<(), _>(self.op_timeout, conn.set_ex(key, encoded, ttl.as_secs().max(1))).await?;
            }
        }
        debug!(key, ttl_secs = ttl.as_secs(), "cache set");
        Ok(())
    }

    async fn try_delete(&self, key: &str) -> Result<(), CacheError> {
        match &self.backend {
            CacheBackend::Disabled => {}
            CacheBackend::Local(map) => {
                map.remove(key);
            }
            CacheBackend::Redis(manager) => {
                let mut conn = manager.clone();
                bounded::<(), _>(self.op_timeout, conn.del(key)).await?;
            }
        }
        debug!(key, "cache invalidated");
        Ok(())
    }

    async fn try_clear(&self) -> Result<(), CacheError> {
        match &self.backend {
            CacheBackend::Disabled => {}
            CacheBackend::Local(map) => map.clear(),
            CacheBackend::Redis(manager) => {
                let mut conn = manager.clone();
                bounded::<(), _>(self.op_timeout, redis::cmd("FLUSHDB").query_async(&mut conn)).await?;
            }
        }
        Ok(())
    }
}

/// Runs one Redis command, giving up after `limit`.
async fn bounded<T, F>(limit: Duration, command: F) -> Result<T, CacheError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, command).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CacheError::Timeout(limit)),
    }
}
