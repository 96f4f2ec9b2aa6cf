//! # Validation Module
//!
//! Input validation and normalization for cart operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Cart operation entry (THIS MODULE)                           │
//! │  ├── Product id: non-empty after trimming                              │
//! │  ├── Product id: normalized (trim + lowercase) before use as a key     │
//! │  └── Quantity: strictly positive                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog existence check (Cart::add_item)                     │
//! │  └── Unknown product ids rejected before any mutation                  │
//! │                                                                         │
//! │  Invalid input NEVER reaches the store: no partial writes.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{normalize_product_id, validate_quantity};
//!
//! // " Apple ", "APPLE" and "apple" all resolve to the same key
//! assert_eq!(normalize_product_id(" Apple ").unwrap(), "apple");
//!
//! // Validate quantity before a cart mutation
//! validate_quantity(5).unwrap();
//! ```

use crate::error::{CartError, CartResult};

// =============================================================================
// Product Id Normalization
// =============================================================================

/// Normalizes a product identifier into its canonical map-key form.
///
/// ## Rules
/// - Surrounding whitespace is trimmed
/// - Case-folded to lowercase
/// - Empty or whitespace-only input is an InvalidArgument error
///
/// ## Example
/// ```rust
/// use tally_core::validation::normalize_product_id;
///
/// assert_eq!(normalize_product_id("Apple").unwrap(), "apple");
/// assert_eq!(normalize_product_id(" APPLE ").unwrap(), "apple");
/// assert!(normalize_product_id("   ").is_err());
/// ```
pub fn normalize_product_id(product_id: &str) -> CartResult<String> {
    let normalized = product_id.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(CartError::invalid_argument(
            "productId",
            "must not be empty or whitespace",
        ));
    }

    Ok(normalized)
}

// =============================================================================
// Quantity Validation
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be at least 1 (an item never exists in a cart with quantity 0)
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-3).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> CartResult<()> {
    if quantity <= 0 {
        return Err(CartError::invalid_argument(
            "quantity",
            format!("must be positive, got {quantity}"),
        ));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_product_id("Apple").unwrap(), "apple");
        assert_eq!(normalize_product_id(" apple ").unwrap(), "apple");
        assert_eq!(normalize_product_id("APPLE").unwrap(), "apple");
        assert_eq!(normalize_product_id("\tBread\n").unwrap(), "bread");
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_product_id("").is_err());
        assert!(normalize_product_id("   ").is_err());
        assert!(normalize_product_id("\t\n").is_err());

        let err = normalize_product_id("").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());

        let err = validate_quantity(0).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("got 0"));
    }
}
