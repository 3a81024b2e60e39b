//! In-memory snapshot store for the Onni world-state cache.
//!
//! Process-local implementation of [`SnapshotStore`], used for single-binary
//! deployments and tests.
//!
//! # Example
//!
//! ```ignore
//! use onni_db_memory::InMemorySnapshotStore;
//! use onni_storage::SnapshotStore;
//!
//! let store = InMemorySnapshotStore::new();
//! assert!(store.get().await?.is_none());
//! ```

pub mod storage;

pub use onni_storage::{SnapshotStore, StorageError};
pub use storage::InMemorySnapshotStore;

/// Creates a new shareable in-memory snapshot store.
pub fn create_snapshot_store() -> onni_storage::DynSnapshotStore {
    std::sync::Arc::new(InMemorySnapshotStore::new())
}
