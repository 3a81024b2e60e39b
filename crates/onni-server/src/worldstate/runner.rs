//! Leader-elected execution of the fetch loop.
//!
//! Every process runs a [`DistributedRunner`]; at most one of them (per lock
//! TTL window) is `Active` and actually polls upstream. Without a reachable
//! lock service the runner falls back to `Unmanaged` and polls on its own.
//!
//! ```text
//! Probing -> Unmanaged -> Stopped            (no lock service, or probe failed)
//! Probing -> Contending <-> Active -> Stopped
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::fetcher::RemoteFetcher;
use super::lock::{DynLockService, LeaseGuard};
use crate::config::LockConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerState {
    Probing,
    Contending,
    Active,
    Unmanaged,
    Stopped,
}

impl RunnerState {
    /// `true` while this process is the one polling upstream.
    pub fn is_fetching(self) -> bool {
        matches!(self, Self::Active | Self::Unmanaged)
    }
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Probing => "probing",
            Self::Contending => "contending",
            Self::Active => "active",
            Self::Unmanaged => "unmanaged",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

pub struct DistributedRunner {
    fetcher: Arc<RemoteFetcher>,
    locks: Option<DynLockService>,
    lock_name: String,
    ttl: Duration,
}

impl DistributedRunner {
    /// `locks = None` runs the fetcher unmanaged.
    pub fn new(
        fetcher: Arc<RemoteFetcher>,
        locks: Option<DynLockService>,
        config: &LockConfig,
    ) -> Self {
        Self {
            fetcher,
            locks,
            lock_name: config.name.clone(),
            ttl: config.ttl(),
        }
    }

    /// Starts the runner on the current runtime. It stops when `shutdown`
    /// (or the handle's own token, a child of it) is cancelled.
    pub fn spawn(self, shutdown: &CancellationToken) -> RunnerHandle {
        let (state_tx, state_rx) = watch::channel(RunnerState::Probing);
        let token = shutdown.child_token();
        let task = tokio::spawn(self.run(token.clone(), state_tx));
        RunnerHandle {
            state: state_rx,
            token,
            task,
        }
    }

    async fn run(self, shutdown: CancellationToken, state: watch::Sender<RunnerState>) {
        let locks = match self.locks.clone() {
            Some(locks) => match locks.probe().await {
                Ok(()) => Some(locks),
                Err(e) => {
                    warn!(error = %e, "lock service unreachable, fetching unmanaged");
                    None
                }
            },
            None => None,
        };

        match locks {
            Some(locks) => self.contend(locks, &shutdown, &state).await,
            None => {
                set_state(&state, RunnerState::Unmanaged);
                self.fetcher.run_loop(shutdown.clone()).await;
            }
        }

        set_state(&state, RunnerState::Stopped);
    }

    async fn contend(
        &self,
        locks: DynLockService,
        shutdown: &CancellationToken,
        state: &watch::Sender<RunnerState>,
    ) {
        let backoff = self.ttl / 2;

        while !shutdown.is_cancelled() && !self.fetcher.is_stop_requested() {
            set_state(state, RunnerState::Contending);

            // Awaited to completion so every granted lease lands in a guard.
            let attempt = locks.try_acquire(&self.lock_name, self.ttl).await;

            match attempt {
                Ok(Some(lease)) => {
                    let guard = LeaseGuard::new(locks.clone(), lease);
                    if shutdown.is_cancelled() {
                        guard.release().await;
                        break;
                    }
                    set_state(state, RunnerState::Active);
                    info!(lock = %self.lock_name, ttl_ms = self.ttl.as_millis() as u64, "acquired fetcher lock");

                    self.fetcher.run_loop(shutdown.clone()).await;
                    guard.release().await;
                    continue;
                }
                Ok(None) => debug!(lock = %self.lock_name, "fetcher lock held elsewhere"),
                Err(e) => warn!(lock = %self.lock_name, error = %e, "lock service error while contending"),
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }
}

fn set_state(state: &watch::Sender<RunnerState>, next: RunnerState) {
    let previous = state.send_replace(next);
    if previous != next {
        debug!(from = %previous, to = %next, "runner state changed");
    }
}

/// Handle to a spawned [`DistributedRunner`].
pub struct RunnerHandle {
    state: watch::Receiver<RunnerState>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RunnerHandle {
    pub fn state(&self) -> RunnerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunnerState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the runner and waits for it to finish, releasing any held
    /// lease on the way out.
    pub async fn stop(self) {
        self.token.cancel();
        self.join().await;
    }

    /// Waits for the runner to finish without cancelling it.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "runner task ended abnormally");
        }
    }
}
