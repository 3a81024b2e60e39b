//! PostgreSQL implementation of the `SnapshotStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;
use time::OffsetDateTime;
use tracing::{debug, warn};

use onni_core::{SNAPSHOT_ID, Snapshot, WorldState, parse_worldstate};
use onni_storage::{SnapshotStore, StorageError};

use crate::config::PostgresConfig;
use crate::error::PostgresError;
use crate::migrations;
use crate::pool;

const SELECT_SNAPSHOT: &str = "SELECT raw_payload, parsed_view, etag, fetched_at \
     FROM worldstate_snapshot WHERE id = $1";

const UPSERT_SNAPSHOT: &str = "INSERT INTO worldstate_snapshot \
     (id, raw_payload, parsed_view, etag, fetched_at) \
     VALUES ($1, $2, $3, $4, $5) \
     ON CONFLICT (id) DO UPDATE SET \
     raw_payload = EXCLUDED.raw_payload, \
     parsed_view = EXCLUDED.parsed_view, \
     etag = EXCLUDED.etag, \
     fetched_at = EXCLUDED.fetched_at";

type SnapshotRow = (Value, Value, Option<String>, DateTime<Utc>);

/// PostgreSQL snapshot store.
///
/// Keeps the snapshot in a single row of `worldstate_snapshot`, upserted by
/// the fixed id.
#[derive(Debug, Clone)]
pub struct PostgresSnapshotStore {
    pool: PgPool,
}

impl PostgresSnapshotStore {
    /// Connects and, unless `config.run_migrations` is off, brings the
    /// schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot connect or a migration fails.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::connect(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SnapshotStore for PostgresSnapshotStore {
    async fn get(&self) -> Result<Option<Snapshot>, StorageError> {
        let row: Option<SnapshotRow> = query_as(SELECT_SNAPSHOT)
            .bind(SNAPSHOT_ID)
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        let Some((raw_payload, parsed_view, etag, fetched_at)) = row else {
            return Ok(None);
        };

        let parsed_view = match serde_json::from_value::<WorldState>(parsed_view) {
            Ok(view) => view,
            Err(e) => {
                // Stored view predates the current schema.
                warn!(error = %e, "stored parsed_view is stale, re-deriving from raw_payload");
                parse_worldstate(&raw_payload)
                    .map_err(|e| StorageError::serialization(e.to_string()))?
            }
        };

        Ok(Some(Snapshot {
            raw_payload,
            parsed_view,
            etag,
            fetched_at: chrono_to_time(fetched_at),
        }))
    }

    async fn put(
        &self,
        raw_payload: &Value,
        parsed_view: &WorldState,
        etag: Option<&str>,
        fetched_at: OffsetDateTime,
    ) -> Result<(), StorageError> {
        let parsed_view = serde_json::to_value(parsed_view).map_err(PostgresError::from)?;

        query(UPSERT_SNAPSHOT)
            .bind(SNAPSHOT_ID)
            .bind(raw_payload)
            .bind(&parsed_view)
            .bind(etag)
            .bind(time_to_chrono(fetched_at))
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        debug!(etag = ?etag, "snapshot upserted");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn time_to_chrono(t: OffsetDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(t.unix_timestamp(), t.nanosecond()).unwrap_or_default()
}

fn chrono_to_time(dt: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(dt.timestamp()).unwrap_or(OffsetDateTime::UNIX_EPOCH)
        + time::Duration::nanoseconds(i64::from(dt.timestamp_subsec_nanos()))
}
