//! # Storage Error Types
//!
//! Error types for Redis-backed storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Redis error (redis::RedisError) / JSON error (serde_json::Error)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds categorization                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartError::Storage (tally-core) ← What cart callers see               │
//! │                                                                         │
//! │  A storage failure is NEVER downgraded to an empty result: callers     │
//! │  can always tell "empty cart" from "could not reach storage".          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tally_core::CartError;
use thiserror::Error;

/// Redis storage operation errors.
///
/// These errors wrap redis and serde_json errors and keep transport
/// failures distinguishable from malformed records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach the Redis server.
    ///
    /// ## When This Occurs
    /// - Server not running / connection refused
    /// - Network partition, I/O timeout
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A Redis command failed after a connection was established.
    #[error("Command failed: {0}")]
    Command(String),

    /// A persisted record could not be (de)serialized.
    ///
    /// ## When This Occurs
    /// - A record written by an incompatible writer
    /// - Manual edits to a stored value
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Convert redis errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// connection refused / I/O    → StoreError::Connection
/// everything else             → StoreError::Command
/// ```
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_io_error() || err.is_connection_dropped() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Everything this crate raises surfaces to cart callers as the Storage
/// kind, keeping the tally-core taxonomy intact.
impl From<StoreError> for CartError {
    fn from(err: StoreError) -> Self {
        CartError::Storage(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_errors_are_categorized() {
        let json_err = serde_json::from_str::<std::collections::HashMap<String, i64>>("not json")
            .unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_store_error_becomes_cart_storage_error() {
        let err = StoreError::Connection("refused".to_string());
        let cart_err: CartError = err.into();
        assert!(cart_err.is_storage());
        assert!(cart_err.to_string().contains("refused"));
    }
}
