//! # onni-storage
//!
//! Storage abstraction for the durable tier of the world-state cache.
//!
//! This crate defines the [`SnapshotStore`] contract and its error type. It
//! does not contain any implementations - those live in `onni-db-memory` and
//! `onni-db-postgres`.
//!
//! The store holds exactly one record, keyed by [`onni_core::SNAPSHOT_ID`].
//! There is no history: every `put` replaces the previous snapshot.
//!
//! ## Example
//!
//! ```ignore
//! use onni_storage::{SnapshotStore, StorageError};
//!
//! async fn last_etag(store: &dyn SnapshotStore) -> Result<Option<String>, StorageError> {
//!     Ok(store.get().await?.and_then(|snapshot| snapshot.etag))
//! }
//! ```

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::SnapshotStore;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared snapshot store trait object.
pub type DynSnapshotStore = std::sync::Arc<dyn SnapshotStore>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use onni_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::traits::SnapshotStore;
    pub use crate::{DynSnapshotStore, StorageResult};
}
