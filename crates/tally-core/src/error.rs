//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CartError       - What cart callers see                           │
//! │  │   ├── InvalidArgument  - bad product id / quantity                  │
//! │  │   ├── NotFound         - catalog lookup miss                        │
//! │  │   └── Storage          - backend transport/serialization failure    │
//! │  └── ObserverError   - Raised inside an observer callback              │
//! │                                                                         │
//! │  tally-redis errors (separate crate)                                   │
//! │  └── StoreError      - Redis command / JSON failures                   │
//! │                                                                         │
//! │  Flow: StoreError → CartError::Storage → Caller                        │
//! │        ObserverError → caught at dispatch, logged, NEVER the caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, field name)
//! 3. Errors are enum variants, never String
//! 4. The three kinds stay distinguishable at every public boundary, so a
//!    caller can always tell "empty cart" from "could not reach storage"

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors surfaced by cart and catalog operations.
///
/// These are raised before any mutation occurs for invalid input, so a
/// failed call never leaves a partial write behind.
#[derive(Debug, Error)]
pub enum CartError {
    /// Input failed validation.
    ///
    /// ## When This Occurs
    /// - Product id is empty or whitespace-only
    /// - Quantity is zero or negative
    /// - Product id unknown to the catalog at add-time
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// Product cannot be found in the price catalog.
    ///
    /// ## When This Occurs
    /// - `Total()` prices an item that was removed from the catalog after
    ///   it was added to the cart
    /// - Direct `price()` lookup for an unknown id
    #[error("product not found: {0}")]
    NotFound(String),

    /// A storage backend operation failed.
    ///
    /// ## When This Occurs
    /// - Redis transport failure (connection refused, timeout)
    /// - A persisted record that does not deserialize
    ///
    /// Never downgraded to an empty result: callers can distinguish
    /// "empty cart" from "could not reach storage".
    #[error("storage operation failed: {0}")]
    Storage(String),
}

impl CartError {
    /// Creates an InvalidArgument error for a given field.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CartError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Storage error from any displayable cause.
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        CartError::Storage(cause.to_string())
    }

    /// True for validation failures.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CartError::InvalidArgument { .. })
    }

    /// True for catalog lookup misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CartError::NotFound(_))
    }

    /// True for backend failures.
    pub fn is_storage(&self) -> bool {
        matches!(self, CartError::Storage(_))
    }
}

// =============================================================================
// Observer Error
// =============================================================================

/// An error raised inside an observer callback.
///
/// ## Containment Contract
/// This error type never crosses the cart boundary. Dispatch catches it,
/// logs it at `warn`, and continues with the remaining observers. The
/// cart's state mutation has already completed before notification begins.
#[derive(Debug, Error)]
#[error("observer callback failed: {0}")]
pub struct ObserverError(pub String);

impl ObserverError {
    /// Creates an ObserverError from any displayable cause.
    pub fn new(cause: impl std::fmt::Display) -> Self {
        ObserverError(cause.to_string())
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
