//! Upstream polling.
//!
//! One conditional GET per cycle. The last accepted etag is sent as
//! `If-None-Match`, so an unchanged feed costs a 304 and no cache write.
//! There is no in-cycle retry; the polling interval is the only backoff.

use std::sync::Arc;
use std::time::Duration;

use onni_core::{ParseError, has_marker};
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use serde_json::Value;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheCoordinator, CacheError};
use crate::config::WorldstateConfig;

/// Result of one successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Upstream answered 304; nothing was written.
    NotModified,
    /// A new document was accepted and stored.
    Updated {
        etag: Option<String>,
        fetched_at: OffsetDateTime,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16, transient: bool },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream payload rejected: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Cache(CacheError),
}

impl FetchError {
    /// `true` for failures expected to clear up on their own (5xx,
    /// timeouts, connection errors).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Upstream { transient, .. } => *transient,
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            Self::InvalidPayload(_) | Self::Cache(_) => false,
        }
    }
}

impl From<CacheError> for FetchError {
    fn from(err: CacheError) -> Self {
        match err {
            // A document that parses as JSON but not as a world state is
            // an upstream problem, not a cache one.
            CacheError::Parse(e) => Self::InvalidPayload(e.to_string()),
            other => Self::Cache(other),
        }
    }
}

/// Polls the upstream feed and hands accepted documents to the coordinator.
pub struct RemoteFetcher {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    marker_field: String,
    coordinator: Arc<CacheCoordinator>,
    last_etag: Mutex<Option<String>>,
    stop: CancellationToken,
}

impl RemoteFetcher {
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(
        config: &WorldstateConfig,
        coordinator: Arc<CacheCoordinator>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("onni/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            interval: config.interval(),
            marker_field: config.marker_field.clone(),
            coordinator,
            last_etag: Mutex::new(None),
            stop: CancellationToken::new(),
        })
    }

    /// The etag that will be sent on the next request.
    pub fn last_etag(&self) -> Option<String> {
        self.last_etag.lock().clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Performs one fetch cycle.
    ///
    /// # Errors
    ///
    /// See [`FetchError`]; on any error the cache and the remembered etag
    /// are unchanged.
    pub async fn fetch_once(&self) -> Result<FetchOutcome, FetchError> {
        let mut request = self.client.get(&self.url);
        if let Some(etag) = self.last_etag() {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            debug!("world state not modified");
            return Ok(FetchOutcome::NotModified);
        }
        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                transient: status.is_server_error(),
            });
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        let raw: Value = serde_json::from_slice(&body)
            .map_err(|e| FetchError::InvalidPayload(format!("response is not JSON: {e}")))?;
        if !has_marker(&raw, &self.marker_field) {
            return Err(FetchError::InvalidPayload(
                ParseError::missing_marker(&self.marker_field).to_string(),
            ));
        }

        let snapshot = self.coordinator.update(raw, etag).await?;
        // Only an accepted document advances the etag.
        *self.last_etag.lock() = snapshot.etag.clone();

        Ok(FetchOutcome::Updated {
            etag: snapshot.etag,
            fetched_at: snapshot.fetched_at,
        })
    }

    /// Polls until `shutdown` is cancelled or [`Self::request_stop`] is called.
    pub async fn run_loop(&self, shutdown: CancellationToken) {
        if self.last_etag().is_none()
            && let Some(stored) = self.coordinator.get().await
        {
            debug!(etag = ?stored.etag, "seeded etag from stored snapshot");
            *self.last_etag.lock() = stored.etag;
        }

        info!(
            url = %self.url,
            interval_ms = self.interval.as_millis() as u64,
            "world state fetch loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.stopped(&shutdown) => break,
                result = self.fetch_once() => log_cycle(&result),
            }
            tokio::select! {
                biased;
                _ = self.stopped(&shutdown) => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("world state fetch loop stopped");
    }

    /// Asks a running loop to exit at its next suspension point.
    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_cancelled()
    }

    async fn stopped(&self, shutdown: &CancellationToken) {
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = self.stop.cancelled() => {}
        }
    }
}

fn log_cycle(result: &Result<FetchOutcome, FetchError>) {
    match result {
        Ok(FetchOutcome::Updated { etag, .. }) => debug!(etag = ?etag, "fetch cycle stored new document"),
        Ok(FetchOutcome::NotModified) => {}
        Err(e) if e.is_transient() => warn!(error = %e, "transient upstream failure"),
        Err(FetchError::Upstream { status, .. }) => {
            error!(status = *status, "upstream rejected request")
        }
        Err(FetchError::Cache(e)) => error!(error = %e, "failed to store world state"),
        Err(e) => error!(error = %e, "world state fetch failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        let server_error = FetchError::Upstream {
            status: 503,
            transient: true,
        };
        assert!(server_error.is_transient());

        let not_found = FetchError::Upstream {
            status: 404,
            transient: false,
        };
        assert!(!not_found.is_transient());
        assert_eq!(not_found.to_string(), "upstream returned HTTP 404");

        assert!(!FetchError::InvalidPayload("x".into()).is_transient());
    }

    #[test]
    fn parse_errors_become_invalid_payload() {
        let err: FetchError = CacheError::Parse(ParseError::NotAnObject("array")).into();
        assert!(matches!(err, FetchError::InvalidPayload(_)));

        let err: FetchError =
            CacheError::Storage(onni_storage::StorageError::internal("x")).into();
        assert!(matches!(err, FetchError::Cache(_)));
    }
}
