//! The snapshot store contract.

use async_trait::async_trait;
use onni_core::{Snapshot, WorldState};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::StorageError;

/// Durable, authoritative tier of the world-state cache.
///
/// Holds a single [`Snapshot`]. Implementations must be thread-safe
/// (`Send + Sync`) and must not retry internally; callers decide what a
/// failure means.
///
/// # Example
///
/// ```ignore
/// use onni_storage::SnapshotStore;
///
/// async fn has_data(store: &dyn SnapshotStore) -> bool {
///     matches!(store.get().await, Ok(Some(_)))
/// }
/// ```
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads the stored snapshot.
    ///
    /// Returns `None` if nothing has ever been stored.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure or decoding issues.
    async fn get(&self) -> Result<Option<Snapshot>, StorageError>;

    /// Replaces the stored snapshot.
    ///
    /// `parsed_view` must be the projection of `raw_payload`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot receive the write.
    async fn put(
        &self,
        raw_payload: &Value,
        parsed_view: &WorldState,
        etag: Option<&str>,
        fetched_at: OffsetDateTime,
    ) -> Result<(), StorageError>;

    /// Short backend identifier for logs (`"memory"`, `"postgres"`).
    fn backend_name(&self) -> &'static str;

    /// Releases backend connections. Idempotent.
    async fn close(&self) {}
}
