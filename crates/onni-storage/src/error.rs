//! Storage error types for the snapshot store.

use std::fmt;

/// Errors that can occur during snapshot store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// A stored or outgoing snapshot could not be (de)serialized.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Serialization` error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the backend could not be reached.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionError { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Serialization { .. } => ErrorCategory::Data,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Categories of storage errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Backend unreachable.
    Infrastructure,
    /// Stored data could not be decoded or encoded.
    Data,
    /// Anything else.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Data => write!(f, "data"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::connection_error("refused");
        assert_eq!(err.to_string(), "Connection error: refused");

        let err = StorageError::internal("boom");
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::connection_error("x").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(StorageError::serialization("x").category(), ErrorCategory::Data);
        assert_eq!(StorageError::internal("x").category().to_string(), "internal");
    }

    #[test]
    fn test_from_serde_json() {
        let err: StorageError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, StorageError::Serialization { .. }));
        assert!(!err.is_connection_error());
    }
}
