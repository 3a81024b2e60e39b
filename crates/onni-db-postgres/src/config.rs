//! Settings for the snapshot store's connection pool.

use std::time::Duration;

use sqlx_core::pool::PoolOptions;
use sqlx_postgres::Postgres;

const DEFAULT_POOL_SIZE: u32 = 5;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// How [`PostgresSnapshotStore`](crate::PostgresSnapshotStore) connects.
///
/// The store holds one row, so the pool stays small; one connection is kept
/// warm for the refresh loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub url: String,
    pub pool_size: u32,
    /// Upper bound on waiting for a pooled connection.
    pub connect_timeout: Duration,
    /// Idle connections beyond the warm one are closed after this long.
    /// `None` keeps them open.
    pub idle_timeout: Option<Duration>,
    /// Apply the embedded migrations when the store is opened.
    pub run_migrations: bool,
}

impl PostgresConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            run_migrations: true,
        }
    }

    /// A pool needs at least one connection; zero is raised to one.
    #[must_use]
    pub fn with_pool_size(mut self, size: u32) -> Self {
        self.pool_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout = Duration::from_millis(ms);
        self
    }

    /// `None` or `Some(0)` disables idle reaping.
    #[must_use]
    pub fn with_idle_timeout_ms(mut self, ms: Option<u64>) -> Self {
        self.idle_timeout = ms.filter(|ms| *ms > 0).map(Duration::from_millis);
        self
    }

    /// Disable when the schema is managed outside the process.
    #[must_use]
    pub fn with_run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub(crate) fn pool_options(&self) -> PoolOptions<Postgres> {
        PoolOptions::new()
            .max_connections(self.pool_size)
            .min_connections(1)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .test_before_acquire(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_idle_reaping_and_migrations() {
        let config = PostgresConfig::new("postgres://localhost/onni");
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(300)));
        assert!(config.run_migrations);
    }

    #[test]
    fn builder_normalizes_degenerate_values() {
        let config = PostgresConfig::new("postgres://localhost/onni")
            .with_pool_size(0)
            .with_connect_timeout_ms(250)
            .with_idle_timeout_ms(Some(0))
            .with_run_migrations(false);
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.idle_timeout, None);
        assert!(!config.run_migrations);

        let options = config.with_idle_timeout_ms(Some(1_500)).pool_options();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_acquire_timeout(), Duration::from_millis(250));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_millis(1_500)));
    }
}
