//! # onni-server
//!
//! Keeps one cached copy of the upstream world state fresh and serves it.
//!
//! - [`cache`]: fast tier (Redis or in-process) in front of the snapshot store
//! - [`worldstate`]: upstream polling and the leadership lock deciding which
//!   process polls
//! - [`server`]: the read API

pub mod cache;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;
pub mod worldstate;

use std::sync::Arc;
use std::time::Duration;

use deadpool_redis::Pool;
use onni_db_postgres::{PostgresConfig, PostgresSnapshotStore};
use onni_storage::{DynSnapshotStore, StorageError};

pub use cache::{
    CacheCoordinator, CacheError, CachedPayload, DynFastCache, FastCache, FastCacheError,
    LocalFastCache, NoOpFastCache, RedisFastCache,
};
pub use config::{
    AppConfig, LockConfig, PostgresStorageConfig, RedisConfig, StorageBackend, StorageConfig,
    WorldstateConfig,
};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{AppState, OnniServer, ServerBuilder, build_app};
pub use worldstate::{
    DistributedRunner, DynLockService, FetchError, FetchOutcome, LocalLockService, LockService,
    RedisLockService, RemoteFetcher, RunnerHandle, RunnerState,
};

/// Builds the Redis connection pool. No connection is made here; the fast
/// cache and lock service probe on first use.
///
/// Returns `None` if Redis is disabled or the pool cannot be configured.
pub fn create_redis_pool(config: &RedisConfig) -> Option<Pool> {
    if !config.enabled {
        tracing::info!("Redis disabled, fast cache and fetcher lock off");
        return None;
    }

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let timeout = Duration::from_millis(config.timeout_ms);
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(timeout);
    pool_config.timeouts.create = Some(timeout);
    pool_config.timeouts.recycle = Some(timeout);
    redis_config.pool = Some(pool_config);

    match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create Redis pool, running without Redis");
            None
        }
    }
}

/// Redis fast cache when a pool exists, otherwise the always-unavailable tier.
pub fn create_fast_cache(pool: Option<&Pool>) -> DynFastCache {
    match pool {
        Some(pool) => Arc::new(RedisFastCache::new(pool.clone())),
        None => Arc::new(NoOpFastCache),
    }
}

/// Redis lock service when locking is enabled and a pool exists.
/// `None` makes the runner fetch unmanaged.
pub fn create_lock_service(config: &LockConfig, pool: Option<&Pool>) -> Option<DynLockService> {
    if !config.enabled {
        tracing::info!("fetcher lock disabled, this process will always fetch");
        return None;
    }
    match pool {
        Some(pool) => Some(Arc::new(RedisLockService::new(pool.clone()))),
        None => {
            tracing::warn!("fetcher lock enabled but Redis is unavailable, fetching unmanaged");
            None
        }
    }
}

/// Connects the configured snapshot store.
///
/// # Errors
///
/// Returns an error if the Postgres pool or its migrations fail.
pub async fn create_snapshot_store(config: &StorageConfig) -> Result<DynSnapshotStore, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory snapshot store, data is lost on restart");
            Ok(onni_db_memory::create_snapshot_store())
        }
        StorageBackend::Postgres => {
            let store = PostgresSnapshotStore::new(postgres_config(&config.postgres)).await?;
            Ok(Arc::new(store))
        }
    }
}

fn postgres_config(pg: &PostgresStorageConfig) -> PostgresConfig {
    PostgresConfig::new(pg.connection_url())
        .with_pool_size(pg.pool_size)
        .with_connect_timeout_ms(pg.connect_timeout_ms)
        .with_idle_timeout_ms(pg.idle_timeout_ms)
        .with_run_migrations(pg.run_migrations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_redis_yields_noop_tiers() {
        let redis = RedisConfig {
            enabled: false,
            ..Default::default()
        };
        let pool = create_redis_pool(&redis);
        assert!(pool.is_none());
        assert!(create_fast_cache(pool.as_ref()).is_unavailable());
        assert!(create_lock_service(&LockConfig::default(), pool.as_ref()).is_none());
    }

    #[tokio::test]
    async fn enabled_redis_builds_lazily() {
        let pool = create_redis_pool(&RedisConfig::default());
        assert!(pool.is_some());
        let locks = create_lock_service(&LockConfig::default(), pool.as_ref()).unwrap();
        assert_eq!(locks.backend_name(), "redis");

        let disabled = LockConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(create_lock_service(&disabled, pool.as_ref()).is_none());
    }

    #[tokio::test]
    async fn memory_backend_store() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        let store = create_snapshot_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn postgres_settings_reach_the_store_config() {
        let pg = PostgresStorageConfig {
            url: Some("postgres://onni@db/onni".into()),
            pool_size: 3,
            connect_timeout_ms: 750,
            idle_timeout_ms: Some(60_000),
            run_migrations: false,
            ..Default::default()
        };
        let config = postgres_config(&pg);
        assert_eq!(config.url, "postgres://onni@db/onni");
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.connect_timeout, Duration::from_millis(750));
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(60)));
        assert!(!config.run_migrations);

        let defaults = postgres_config(&PostgresStorageConfig::default());
        assert_eq!(defaults.idle_timeout, Some(Duration::from_secs(300)));
        assert!(defaults.run_migrations);
    }
}
