use async_trait::async_trait;
use onni_core::{Snapshot, WorldState};
use onni_storage::{SnapshotStore, StorageError};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory snapshot store.
///
/// Holds at most one [`Snapshot`]; each `put` replaces it. Never fails.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    slot: RwLock<Option<Snapshot>>,
    writes: AtomicU64,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls since creation.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Drops the stored snapshot.
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn get(&self) -> Result<Option<Snapshot>, StorageError> {
        Ok(self.slot.read().await.clone())
    }

    async fn put(
        &self,
        raw_payload: &Value,
        parsed_view: &WorldState,
        etag: Option<&str>,
        fetched_at: OffsetDateTime,
    ) -> Result<(), StorageError> {
        let snapshot = Snapshot {
            raw_payload: raw_payload.clone(),
            parsed_view: parsed_view.clone(),
            etag: etag.map(str::to_owned),
            fetched_at,
        };
        *self.slot.write().await = Some(snapshot);
        let writes = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(writes, "in-memory snapshot replaced");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onni_core::parse_worldstate;
    use serde_json::json;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_empty_store_returns_none() {
        let store = InMemorySnapshotStore::new();
        assert!(store.get().await.unwrap().is_none());
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_put_replaces_snapshot() {
        let store = InMemorySnapshotStore::new();

        let v1 = json!({"WorldSeed": "a", "Version": 1});
        let v2 = json!({"WorldSeed": "b", "Version": 2});
        let at1 = datetime!(2024-05-01 12:00 UTC);
        let at2 = datetime!(2024-05-01 12:00:02 UTC);

        store
            .put(&v1, &parse_worldstate(&v1).unwrap(), Some("e1"), at1)
            .await
            .unwrap();
        store
            .put(&v2, &parse_worldstate(&v2).unwrap(), None, at2)
            .await
            .unwrap();

        let stored = store.get().await.unwrap().unwrap();
        assert_eq!(stored.raw_payload, v2);
        assert_eq!(stored.parsed_view.version, Some(2));
        assert_eq!(stored.etag, None);
        assert_eq!(stored.fetched_at, at2);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemorySnapshotStore::new();
        let raw = json!({"WorldSeed": "a"});
        store
            .put(
                &raw,
                &parse_worldstate(&raw).unwrap(),
                None,
                OffsetDateTime::now_utc(),
            )
            .await
            .unwrap();
        store.clear().await;
        assert!(store.get().await.unwrap().is_none());
    }
}
