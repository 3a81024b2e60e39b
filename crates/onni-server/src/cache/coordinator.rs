//! Two-tier read/write coordination over the fast cache and snapshot store.

use std::sync::Arc;

use onni_core::{ParseError, Snapshot, WorldState};
use onni_storage::{DynSnapshotStore, StorageError};
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::fast::{DynFastCache, FastCacheError};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("payload rejected: {0}")]
    Parse(#[from] ParseError),

    #[error("snapshot store write failed: {0}")]
    Storage(#[from] StorageError),
}

/// Owns the fast tier and the snapshot store and keeps them in step.
///
/// ## Lookup Order
///
/// 1. Fast cache
/// 2. Snapshot store (repopulating the fast cache on hit)
///
/// ## Write Strategy
///
/// The payload is parsed before anything is written. Writes are serialized
/// within the process; the fast cache write is best-effort and the store
/// write is authoritative. If the store write fails after the fast cache
/// accepted the document, readers may see the new document until the next
/// successful update.
pub struct CacheCoordinator {
    fast: DynFastCache,
    store: DynSnapshotStore,
    write_lock: Mutex<()>,
}

impl CacheCoordinator {
    pub fn new(fast: DynFastCache, store: DynSnapshotStore) -> Self {
        Self {
            fast,
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn shared(fast: DynFastCache, store: DynSnapshotStore) -> Arc<Self> {
        Arc::new(Self::new(fast, store))
    }

    /// Latest snapshot, or `None` if nothing was ever stored. Never fails:
    /// store errors are logged and reported as absent.
    pub async fn get(&self) -> Option<Snapshot> {
        if let Some(cached) = self.fast.get().await {
            match Snapshot::from_payload(cached.raw, cached.etag, cached.fetched_at) {
                Ok(snapshot) => return Some(snapshot),
                Err(e) => {
                    tracing::warn!(error = %e, "cached document no longer parses, reading store");
                }
            }
        }

        match self.store.get().await {
            Ok(Some(snapshot)) => {
                self.repopulate(&snapshot).await;
                Some(snapshot)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    category = %e.category(),
                    backend = self.store.backend_name(),
                    "snapshot store read failed"
                );
                None
            }
        }
    }

    /// Parsed view of the latest snapshot.
    pub async fn current_view(&self) -> Option<WorldState> {
        self.get().await.map(|s| s.parsed_view)
    }

    /// Parses `raw_payload` and writes it to both tiers.
    ///
    /// # Errors
    ///
    /// [`CacheError::Parse`] if the payload is rejected (nothing written),
    /// [`CacheError::Storage`] if the authoritative write failed.
    pub async fn update(
        &self,
        raw_payload: Value,
        etag: Option<String>,
    ) -> Result<Snapshot, CacheError> {
        let _guard = self.write_lock.lock().await;

        let fetched_at = write_timestamp();
        let snapshot = Snapshot::from_payload(raw_payload, etag, fetched_at)?;

        match self
            .fast
            .set(&snapshot.raw_payload, snapshot.etag.as_deref(), fetched_at)
            .await
        {
            Ok(()) | Err(FastCacheError::Unavailable) => {}
            Err(e) => tracing::warn!(error = %e, "fast cache write failed, continuing with store"),
        }

        self.store
            .put(
                &snapshot.raw_payload,
                &snapshot.parsed_view,
                snapshot.etag.as_deref(),
                fetched_at,
            )
            .await?;

        tracing::info!(etag = ?snapshot.etag, "world state updated");
        Ok(snapshot)
    }

    /// `false` once the fast tier is known to be unreachable.
    pub fn fast_cache_available(&self) -> bool {
        !self.fast.is_unavailable()
    }

    pub fn fast_cache_backend(&self) -> &'static str {
        self.fast.backend_name()
    }

    /// Closes both tiers.
    pub async fn close(&self) {
        self.fast.close().await;
        self.store.close().await;
    }

    async fn repopulate(&self, snapshot: &Snapshot) {
        if self.fast.is_unavailable() {
            return;
        }
        match self
            .fast
            .set(
                &snapshot.raw_payload,
                snapshot.etag.as_deref(),
                snapshot.fetched_at,
            )
            .await
        {
            Ok(()) => tracing::debug!("fast cache repopulated from store"),
            Err(FastCacheError::Unavailable) => {}
            Err(e) => tracing::warn!(error = %e, "fast cache repopulation failed"),
        }
    }
}

/// Current time at the snapshot store's resolution (microseconds), so a
/// snapshot read back from any tier compares equal to the one written.
fn write_timestamp() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - time::Duration::nanoseconds(i64::from(now.nanosecond() % 1_000))
}
