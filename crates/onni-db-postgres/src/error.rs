//! Error types for the PostgreSQL snapshot store.

use onni_storage::StorageError;

/// Errors specific to the PostgreSQL backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::error::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Stored JSON could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Database(e) => match e {
                sqlx_core::error::Error::Database(_)
                | sqlx_core::error::Error::ColumnDecode { .. }
                | sqlx_core::error::Error::RowNotFound => StorageError::internal(e.to_string()),
                other => StorageError::connection_error(other.to_string()),
            },
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Serialization(e) => StorageError::serialization(e.to_string()),
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
