//! # Key Naming
//!
//! Every Redis key this crate touches is built here, so the naming
//! convention lives in exactly one place.
//!
//! ## Convention
//! ```text
//! cart:<cartId>            one JSON record per cart
//! product:<productId>      one JSON record per catalog product
//! product:*                catalog enumeration pattern (SCAN MATCH)
//! ```

/// Default key prefix for catalog records.
pub const DEFAULT_CATALOG_PREFIX: &str = "product";

/// Key of a cart record: `cart:<cartId>`.
pub fn cart_key(cart_id: &str) -> String {
    format!("cart:{cart_id}")
}

/// Key of a catalog record: `<prefix>:<productId>`.
///
/// The product portion is expected to already be normalized (the catalog
/// normalizes before calling).
pub fn catalog_key(prefix: &str, product_id: &str) -> String {
    format!("{prefix}:{product_id}")
}

/// SCAN MATCH pattern covering every catalog record under a prefix.
pub fn catalog_pattern(prefix: &str) -> String {
    format!("{prefix}:*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_key() {
        assert_eq!(cart_key("alice"), "cart:alice");
    }

    #[test]
    fn test_catalog_key_and_pattern() {
        assert_eq!(catalog_key(DEFAULT_CATALOG_PREFIX, "apple"), "product:apple");
        assert_eq!(catalog_pattern(DEFAULT_CATALOG_PREFIX), "product:*");
        assert_eq!(catalog_key("sku", "apple"), "sku:apple");
    }

    #[test]
    fn test_distinct_cart_ids_never_collide() {
        assert_ne!(cart_key("alice"), cart_key("bob"));
    }
}
