//! Keeping the cached world state fresh: upstream polling, the leadership
//! lock, and the runner that ties them together.

pub mod fetcher;
pub mod lock;
pub mod runner;

pub use fetcher::{FetchError, FetchOutcome, RemoteFetcher};
pub use lock::{
    DynLockService, Lease, LeaseGuard, LocalLockService, LockError, LockService, RedisLockService,
};
pub use runner::{DistributedRunner, RunnerHandle, RunnerState};
