//! Leadership lock for the fetch loop.
//!
//! A named lease with a fixed TTL, identified by a random holder token so
//! that release only ever removes the caller's own lease. Leases are not
//! renewed: a holder whose work outlives the TTL may overlap with the next
//! holder.
//!
//! An acquire whose future is dropped after the server granted the lease
//! cannot release it; the lease then lingers until its TTL. Callers await
//! [`LockService::try_acquire`] to completion and wrap the result in a
//! [`LeaseGuard`] straight away.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::Pool;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Deletes the key only if it still holds the caller's token.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("lock service pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("lock service command error: {0}")]
    Command(#[from] redis::RedisError),

    #[error("lock service unavailable: {0}")]
    Unavailable(String),
}

/// A held lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub name: String,
    pub token: String,
    pub ttl: Duration,
}

impl Lease {
    fn new(name: &str, ttl: Duration) -> Self {
        Self {
            name: name.to_owned(),
            token: Uuid::new_v4().to_string(),
            ttl,
        }
    }
}

#[async_trait]
pub trait LockService: Send + Sync {
    /// Checks that the service is reachable.
    async fn probe(&self) -> Result<(), LockError>;

    /// Non-blocking acquire. `Ok(None)` means another holder has the lease.
    async fn try_acquire(&self, name: &str, ttl: Duration) -> Result<Option<Lease>, LockError>;

    /// Releases `lease` if it is still held by its token. Returns `false`
    /// when the lease had already expired or changed hands.
    async fn release(&self, lease: &Lease) -> Result<bool, LockError>;

    fn backend_name(&self) -> &'static str;
}

pub type DynLockService = Arc<dyn LockService>;

// ---- Redis ----

/// Redis lock: `SET key token NX PX ttl`, released by compare-and-delete.
pub struct RedisLockService {
    pool: Pool,
}

impl RedisLockService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockService for RedisLockService {
    async fn probe(&self) -> Result<(), LockError> {
        let mut conn = self.pool.get().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn try_acquire(&self, name: &str, ttl: Duration) -> Result<Option<Lease>, LockError> {
        let lease = Lease::new(name, ttl);
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        let mut conn = self.pool.get().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(name)
            .arg(&lease.token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;

        Ok(reply.map(|_| lease))
    }

    async fn release(&self, lease: &Lease) -> Result<bool, LockError> {
        let script = redis::Script::new(RELEASE_SCRIPT);
        let mut conn = self.pool.get().await?;
        let removed: i64 = script
            .key(&lease.name)
            .arg(&lease.token)
            .invoke_async(&mut conn)
            .await?;
        Ok(removed == 1)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

// ---- Local ----

/// Process-local lock with the same semantics as [`RedisLockService`].
#[derive(Default)]
pub struct LocalLockService {
    held: Mutex<HashMap<String, (String, Instant)>>,
}

impl LocalLockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the current unexpired holder of `name`.
    pub fn holder(&self, name: &str) -> Option<String> {
        let held = self.held.lock();
        held.get(name)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(token, _)| token.clone())
    }
}

#[async_trait]
impl LockService for LocalLockService {
    async fn probe(&self) -> Result<(), LockError> {
        Ok(())
    }

    async fn try_acquire(&self, name: &str, ttl: Duration) -> Result<Option<Lease>, LockError> {
        let now = Instant::now();
        let mut held = self.held.lock();
        if let Some((_, expires)) = held.get(name)
            && *expires > now
        {
            return Ok(None);
        }
        let lease = Lease::new(name, ttl);
        held.insert(name.to_owned(), (lease.token.clone(), now + ttl));
        Ok(Some(lease))
    }

    async fn release(&self, lease: &Lease) -> Result<bool, LockError> {
        let mut held = self.held.lock();
        match held.get(&lease.name) {
            Some((token, expires)) if *token == lease.token && *expires > Instant::now() => {
                held.remove(&lease.name);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

// ---- Guard ----

/// Releases its lease when dropped, if [`LeaseGuard::release`] was not called.
pub struct LeaseGuard {
    service: DynLockService,
    lease: Option<Lease>,
}

impl LeaseGuard {
    pub fn new(service: DynLockService, lease: Lease) -> Self {
        Self {
            service,
            lease: Some(lease),
        }
    }

    pub fn lease(&self) -> Option<&Lease> {
        self.lease.as_ref()
    }

    /// Releases the lease now. An expired lease is not an error.
    pub async fn release(mut self) {
        let Some(lease) = self.lease.take() else {
            return;
        };
        match self.service.release(&lease).await {
            Ok(true) => debug!(lock = %lease.name, "lease released"),
            Ok(false) => debug!(lock = %lease.name, "lease already expired or taken over"),
            Err(e) => warn!(lock = %lease.name, error = %e, "lease release failed, will expire via TTL"),
        }
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        let Some(lease) = self.lease.take() else {
            return;
        };
        // Outside a runtime the lease simply expires.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let service = self.service.clone();
        handle.spawn(async move {
            match service.release(&lease).await {
                Ok(_) => debug!(lock = %lease.name, "lease released on drop"),
                Err(e) => debug!(lock = %lease.name, error = %e, "lease release on drop failed"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "worldstate:fetcher_lock";

    #[tokio::test]
    async fn second_acquire_fails_while_held() {
        let locks = LocalLockService::new();
        let lease = locks
            .try_acquire(NAME, Duration::from_secs(10))
            .await
            .unwrap()
            .expect("first acquire");
        assert!(
            locks
                .try_acquire(NAME, Duration::from_secs(10))
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(locks.holder(NAME), Some(lease.token.clone()));

        assert!(locks.release(&lease).await.unwrap());
        assert!(locks.holder(NAME).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_lease_can_be_taken_over() {
        let locks = LocalLockService::new();
        let first = locks
            .try_acquire(NAME, Duration::from_secs(10))
            .await
            .unwrap()
            .unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;

        let second = locks
            .try_acquire(NAME, Duration::from_secs(10))
            .await
            .unwrap()
            .expect("expired lease is free");
        // The stale holder must not remove the new lease.
        assert!(!locks.release(&first).await.unwrap());
        assert_eq!(locks.holder(NAME), Some(second.token));
    }

    #[tokio::test]
    async fn dropped_guard_releases_in_background() {
        let locks: Arc<LocalLockService> = Arc::new(LocalLockService::new());
        let lease = locks
            .try_acquire(NAME, Duration::from_secs(10))
            .await
            .unwrap()
            .unwrap();

        drop(LeaseGuard::new(locks.clone(), lease));

        for _ in 0..50 {
            if locks.holder(NAME).is_none() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("lease was not released after guard drop");
    }

    #[tokio::test]
    async fn explicit_release_consumes_guard() {
        let locks: Arc<LocalLockService> = Arc::new(LocalLockService::new());
        let lease = locks
            .try_acquire(NAME, Duration::from_secs(10))
            .await
            .unwrap()
            .unwrap();
        let guard = LeaseGuard::new(locks.clone(), lease);
        assert!(guard.lease().is_some());
        guard.release().await;
        assert!(locks.holder(NAME).is_none());
    }
}
