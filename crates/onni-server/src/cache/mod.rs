//! World-state caching: a best-effort fast tier in front of the
//! authoritative snapshot store.

pub mod coordinator;
pub mod fast;

pub use coordinator::{CacheCoordinator, CacheError};
pub use fast::{
    CachedPayload, DynFastCache, FastCache, FastCacheError, LocalFastCache, NoOpFastCache,
    RedisFastCache,
};
