//! Error types for the payment status service

use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum Error {
    /// Key-value store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General error
    #[error("{0}")]
    General(String),
}

/// Key-value store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Could not establish a connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Command did not complete within the configured timeout
    #[error("Timed out after {0}ms")]
    Timeout(u64),

    /// Command was rejected or failed on the server
    #[error("Command error: {0}")]
    Command(String),

    /// Store is unavailable
    #[error("Store unavailable")]
    Unavailable,

    /// Connection was closed by shutdown
    #[error("Store connection closed")]
    Closed,
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        // timeouts are mapped by the store, which knows the configured bound
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_wraps_into_error() {
        let err: Error = StoreError::Timeout(5000).into();
        assert_eq!(err.to_string(), "Store error: Timed out after 5000ms");
    }

    #[test]
    fn test_redis_error_classification() {
        let err = redis::RedisError::from((redis::ErrorKind::ResponseError, "WRONGTYPE"));
        assert!(matches!(StoreError::from(err), StoreError::Command(_)));

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = redis::RedisError::from(io);
        assert!(matches!(StoreError::from(err), StoreError::Connection(_)));
    }
}
