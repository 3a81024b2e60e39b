//! Fast cache tier.
//!
//! A low-latency copy of the latest upstream document, shared across
//! processes when backed by Redis. It is never authoritative: every failure
//! here degrades to a miss and the coordinator falls back to the snapshot
//! store.
//!
//! ## Modes
//!
//! - **Redis**: shared tier. Reachability is probed once, lazily; a failed
//!   probe disables the tier for the rest of the process lifetime.
//! - **Local**: in-process tier for single-binary deployments and tests
//! - **NoOp**: always unavailable, used when Redis is disabled

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use deadpool_redis::Pool;
use serde_json::Value;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::OnceCell;

/// Key holding the serialized upstream document.
pub const DATA_KEY: &str = "worldstate:data";
/// Key holding the upstream change token.
pub const ETAG_KEY: &str = "worldstate:etag";
/// Key holding the RFC 3339 retrieval time.
pub const FETCHED_AT_KEY: &str = "worldstate:fetched_at";

/// What the fast tier stores: the raw document plus freshness metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPayload {
    pub raw: Value,
    pub etag: Option<String>,
    pub fetched_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum FastCacheError {
    #[error("fast cache unavailable")]
    Unavailable,

    #[error("redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("redis command error: {0}")]
    Command(#[from] redis::RedisError),

    #[error("payload encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("timestamp formatting error: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Contract for the fast cache tier.
#[async_trait]
pub trait FastCache: Send + Sync {
    /// Returns the cached document, or `None` on miss, error or unavailability.
    async fn get(&self) -> Option<CachedPayload>;

    /// Replaces the cached document. Absent `etag` clears the stored one.
    async fn set(
        &self,
        raw: &Value,
        etag: Option<&str>,
        fetched_at: OffsetDateTime,
    ) -> Result<(), FastCacheError>;

    /// `true` once the tier is known to be unreachable.
    fn is_unavailable(&self) -> bool;

    /// Short backend identifier for logs.
    fn backend_name(&self) -> &'static str;

    /// Releases connections. Idempotent.
    async fn close(&self) {}
}

/// Shared fast cache trait object.
pub type DynFastCache = Arc<dyn FastCache>;

// ---- Redis ----

/// Redis-backed fast cache.
pub struct RedisFastCache {
    pool: Pool,
    probe: OnceCell<bool>,
}

impl RedisFastCache {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            probe: OnceCell::new(),
        }
    }

    /// Probes reachability on first use only.
    async fn ensure_available(&self) -> bool {
        *self
            .probe
            .get_or_init(|| async {
                match ping(&self.pool).await {
                    Ok(()) => {
                        tracing::info!("fast cache connected to Redis");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "Redis unreachable, fast cache disabled for this process"
                        );
                        false
                    }
                }
            })
            .await
    }

    async fn read(&self) -> Result<Option<CachedPayload>, FastCacheError> {
        let mut conn = self.pool.get().await?;
        let (data, etag, fetched_at): (Option<String>, Option<String>, Option<String>) =
            redis::cmd("MGET")
                .arg(DATA_KEY)
                .arg(ETAG_KEY)
                .arg(FETCHED_AT_KEY)
                .query_async(&mut conn)
                .await?;

        let Some(data) = data else {
            return Ok(None);
        };
        let raw: Value = match serde_json::from_str(&data) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "cached document is not valid JSON, treating as miss");
                return Ok(None);
            }
        };
        let fetched_at = match fetched_at
            .as_deref()
            .map(|s| OffsetDateTime::parse(s, &Rfc3339))
        {
            Some(Ok(at)) => at,
            _ => {
                tracing::warn!(fetched_at = ?fetched_at, "cached fetched_at missing or invalid, treating as miss");
                return Ok(None);
            }
        };

        Ok(Some(CachedPayload {
            raw,
            etag,
            fetched_at,
        }))
    }
}

pub(crate) async fn ping(pool: &Pool) -> Result<(), FastCacheError> {
    let mut conn = pool.get().await?;
    let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
}

#[async_trait]
impl FastCache for RedisFastCache {
    async fn get(&self) -> Option<CachedPayload> {
        if !self.ensure_available().await {
            return None;
        }
        match self.read().await {
            Ok(hit) => {
                tracing::debug!(hit = hit.is_some(), "fast cache lookup");
                hit
            }
            Err(e) => {
                tracing::warn!(error = %e, "fast cache read failed");
                None
            }
        }
    }

    async fn set(
        &self,
        raw: &Value,
        etag: Option<&str>,
        fetched_at: OffsetDateTime,
    ) -> Result<(), FastCacheError> {
        if !self.ensure_available().await {
            return Err(FastCacheError::Unavailable);
        }
        let data = serde_json::to_string(raw)?;
        let fetched_at = fetched_at.format(&Rfc3339)?;

        let mut conn = self.pool.get().await?;
        let mut pipe = redis::pipe();
        pipe.atomic()
            .set(DATA_KEY, data)
            .ignore()
            .set(FETCHED_AT_KEY, fetched_at)
            .ignore();
        match etag {
            Some(etag) => pipe.set(ETAG_KEY, etag).ignore(),
            None => pipe.del(ETAG_KEY).ignore(),
        };
        let () = pipe.query_async(&mut conn).await?;

        tracing::debug!(etag = ?etag, "fast cache updated");
        Ok(())
    }

    fn is_unavailable(&self) -> bool {
        self.probe.get() == Some(&false)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn close(&self) {
        self.pool.close();
    }
}

// ---- Local ----

/// In-process fast cache.
#[derive(Default)]
pub struct LocalFastCache {
    slot: ArcSwapOption<CachedPayload>,
}

impl LocalFastCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the cached document.
    pub fn clear(&self) {
        self.slot.store(None);
    }

    /// Overwrites the cached document without validation.
    pub fn store(&self, payload: CachedPayload) {
        self.slot.store(Some(Arc::new(payload)));
    }
}

#[async_trait]
impl FastCache for LocalFastCache {
    async fn get(&self) -> Option<CachedPayload> {
        self.slot.load_full().map(|p| (*p).clone())
    }

    async fn set(
        &self,
        raw: &Value,
        etag: Option<&str>,
        fetched_at: OffsetDateTime,
    ) -> Result<(), FastCacheError> {
        self.store(CachedPayload {
            raw: raw.clone(),
            etag: etag.map(str::to_owned),
            fetched_at,
        });
        Ok(())
    }

    fn is_unavailable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

// ---- NoOp ----

/// Fast cache that is always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpFastCache;

#[async_trait]
impl FastCache for NoOpFastCache {
    async fn get(&self) -> Option<CachedPayload> {
        None
    }

    async fn set(
        &self,
        _raw: &Value,
        _etag: Option<&str>,
        _fetched_at: OffsetDateTime,
    ) -> Result<(), FastCacheError> {
        Err(FastCacheError::Unavailable)
    }

    fn is_unavailable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[tokio::test]
    async fn local_cache_round_trip_and_etag_clear() {
        let cache = LocalFastCache::new();
        assert!(cache.get().await.is_none());

        let at = datetime!(2024-05-01 12:00 UTC);
        cache
            .set(&json!({"WorldSeed": "a"}), Some("e1"), at)
            .await
            .unwrap();
        let hit = cache.get().await.unwrap();
        assert_eq!(hit.raw["WorldSeed"], "a");
        assert_eq!(hit.etag.as_deref(), Some("e1"));
        assert_eq!(hit.fetched_at, at);

        cache.set(&json!({"WorldSeed": "b"}), None, at).await.unwrap();
        assert_eq!(cache.get().await.unwrap().etag, None);

        cache.clear();
        assert!(cache.get().await.is_none());
        assert!(!cache.is_unavailable());
    }

    #[tokio::test]
    async fn noop_cache_is_unavailable() {
        let cache = NoOpFastCache;
        assert!(cache.is_unavailable());
        assert!(cache.get().await.is_none());
        let err = cache
            .set(&json!({}), None, OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert!(matches!(err, FastCacheError::Unavailable));
    }

    #[tokio::test]
    async fn unreachable_redis_disables_after_one_probe() {
        let cfg = deadpool_redis::Config::from_url("redis://127.0.0.1:1");
        let pool = cfg
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .unwrap();
        let cache = RedisFastCache::new(pool);

        // Unknown until first use.
        assert!(!cache.is_unavailable());
        assert!(cache.get().await.is_none());
        assert!(cache.is_unavailable());

        let err = cache
            .set(&json!({"WorldSeed": "a"}), None, OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert!(matches!(err, FastCacheError::Unavailable));
    }
}
